mod session_tests {
    pub mod helpers;
    mod lifecycle;
    mod session;
}

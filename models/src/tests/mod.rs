mod credentials;
mod frame;

use std::sync::OnceLock;

use regex::Regex;

const UUID_V4_PATTERN: &str =
    r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-4[0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}$";
const CHANNEL_NAME_PATTERN: &str = r"^[a-zA-Z0-9\- ]{3,50}$";
// Shape only: octets are not range checked.
const DOTTED_QUAD_PATTERN: &str = r"^[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}$";

static UUID_V4_REGEX: OnceLock<Regex> = OnceLock::new();
static CHANNEL_NAME_REGEX: OnceLock<Regex> = OnceLock::new();
static DOTTED_QUAD_REGEX: OnceLock<Regex> = OnceLock::new();

pub(crate) fn get_uuid_v4_regex() -> &'static Regex {
    UUID_V4_REGEX.get_or_init(|| Regex::new(UUID_V4_PATTERN).expect("valid regex pattern"))
}

pub(crate) fn get_channel_name_regex() -> &'static Regex {
    CHANNEL_NAME_REGEX
        .get_or_init(|| Regex::new(CHANNEL_NAME_PATTERN).expect("valid regex pattern"))
}

pub(crate) fn get_dotted_quad_regex() -> &'static Regex {
    DOTTED_QUAD_REGEX.get_or_init(|| Regex::new(DOTTED_QUAD_PATTERN).expect("valid regex pattern"))
}

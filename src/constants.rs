use std::time::Duration;

pub const BOSSES_PATH: &str = "bosses";
pub const TOKENS_PATH: &str = "tokens";

pub const DEFAULT_NAME: &str = "Unknown";
pub const DEFAULT_GUILD: &str = "FFA";

pub const IMMINENT_WINDOW_MS: i64 = 10 * 60 * 1000;
pub const SPAWNING_NOW_WINDOW_MS: i64 = 5 * 60 * 1000;

pub const TICK_INTERVAL: Duration = Duration::from_millis(1000);
pub const FLAG_POLL_INTERVAL: Duration = Duration::from_millis(250);

pub const DATETIME_LOCAL_FORMAT: &str = "%Y-%m-%dT%H:%M";
pub const SPAWN_DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub const NOT_FOUND_NOTICE: &str = "Boss not found!";
pub const INVALID_TOKEN_NOTICE: &str = "Invalid token";
pub const TOKEN_CHECK_FAILED_NOTICE: &str = "Token check failed";
pub const ACCESS_GRANTED_NOTICE: &str = "Access granted!";
pub const LOAD_FAILED_NOTICE: &str = "Error loading bosses";

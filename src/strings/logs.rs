pub const STATE_DISABLED: &str = "No Redis URL configured, state mirroring disabled.";
pub const SHUTDOWN: &str = "Shutting down...";

pub fn config_loaded(path: &str) -> String {
    format!("Loaded configuration from {path}")
}

pub fn config_missing(path: &str) -> String {
    format!("No configuration at {path}, using defaults")
}

pub fn redis_connected(url: &str) -> String {
    format!("Connected to Redis at {url}")
}

pub fn redis_connect_fail(err: &str) -> String {
    format!("Unable to connect to Redis: {err}")
}

pub fn registered_commands(count: usize, prefixes: &[String]) -> String {
    format!("Registered {count} commands, listening for prefixes {prefixes:?}")
}

pub fn connected_as(name: &str, id: &str) -> String {
    format!("Connected as {name} ({id})")
}

pub fn dispatch_failed(event: &str, err: &str) -> String {
    format!("Handling {event} failed: {err}")
}

pub fn client_fail(err: &str) -> String {
    format!("Client error: {err}")
}

pub fn shutdown_fail(err: &str) -> String {
    format!("Unable to listen for shutdown signal: {err}")
}

use std::{env, time::Duration};

pub(crate) const DEFAULT_INPUT_HOST: &str = "input.threads.io";
pub(crate) const INPUT_HOST_ENV: &str = "THREADS_INPUT_HOST";
pub(crate) const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

pub(crate) fn default_input_host() -> String {
    env::var(INPUT_HOST_ENV)
        .ok()
        .map(|host| host.trim().to_string())
        .filter(|host| !host.is_empty())
        .unwrap_or_else(|| DEFAULT_INPUT_HOST.to_string())
}

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the stderr `tracing` subscriber.
///
/// Default filter is `atp_knee=warn`; `verbose` raises it to debug and
/// `quiet` forces errors only, ignoring `RUST_LOG`. Otherwise `RUST_LOG`
/// overrides the default.
///
/// A subscriber that is already installed (tests, repeated calls) is kept.
pub fn init_logging(verbose: bool, quiet: bool) {
    let flag_filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("atp_knee=debug,info")
    } else {
        EnvFilter::new("atp_knee=warn,error")
    };

    let env_filter = if quiet {
        flag_filter
    } else if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::try_from_default_env().unwrap_or(flag_filter)
    } else {
        flag_filter
    };

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .with_ansi(true);

    if let Err(e) = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
    {
        tracing::debug!(error = %e, "keeping existing tracing subscriber");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_init_keeps_first_subscriber() {
        init_logging(false, false);
        init_logging(true, false);
        init_logging(false, true);
        tracing::debug!("still logging after re-init");
    }
}

pub mod flows;

pub fn load_test_env() {
    dotenvy::from_filename(".env.test").ok();
    // Several tests race to install the subscriber; only the first wins.
    let _ = crate::telemetry::init_tracing();
}

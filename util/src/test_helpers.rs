use std::env;

/// Populates the environment variables `AppConfig` requires, then reloads the
/// global configuration so the values take effect.
///
/// Safe to call from many tests; existing overrides are replaced.
pub fn setup_test_env() {
    unsafe {
        env::set_var("APP_ENV", "test");
        env::set_var("DATABASE_PATH", "sqlite::memory:");
        env::set_var("JWT_SECRET", "campus-connect-test-secret");
        env::set_var("JWT_DURATION_MINUTES", "60");
        env::remove_var("QR_CODE_TTL_MINUTES");
        env::remove_var("CERTIFICATE_PREFIX");
        env::remove_var("CERTIFICATE_BASE_URL");
    }
    crate::config::AppConfig::reset();
}

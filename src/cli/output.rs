//! CLI output formatting utilities

use colored::Colorize;

use crate::config::Config;

/// Print a success message
pub fn success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

/// Print an error message
pub fn error(message: &str) {
    eprintln!("{} {}", "✗".red(), message);
}

/// Print a warning message
pub fn warn(message: &str) {
    println!("{} {}", "⚠".yellow(), message);
}

/// Print an info message
pub fn info(message: &str) {
    println!("{} {}", "ℹ".blue(), message);
}

/// Print the effective configuration with secrets redacted
pub fn print_config_summary(config: &Config) {
    let secret_state = |secret: &str| {
        if secret.is_empty() {
            "unset".red().to_string()
        } else {
            format!("set ({} bytes)", secret.len()).green().to_string()
        }
    };

    println!("{}", "Server".bold());
    println!("  listen:          {}:{}", config.server.host, config.server.port);
    println!("{}", "Auth".bold());
    println!("  access secret:   {}", secret_state(&config.auth.access_secret));
    println!("  refresh secret:  {}", secret_state(&config.auth.refresh_secret));
    println!("  bcrypt cost:     {}", config.auth.bcrypt_cost);
    println!("  access ttl:      {}s", config.auth.access_ttl_secs);
    println!("  refresh ttl:     {}s", config.auth.refresh_ttl_secs);
    println!("{}", "Database".bold());
    if config.uses_postgres() {
        println!("  store:           {}", "postgres".green());
    } else {
        println!("  store:           {}", "in-memory".yellow());
    }
    println!("  migrate on boot: {}", config.database.migrate);
}

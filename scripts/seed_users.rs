//! Seed accounts straight into the credential store
//!
//! Each argument is a `username:password` pair. Existing usernames are left
//! untouched. Run with the server stopped (sled holds an exclusive lock):
//!   cargo run --bin seed_users -- admin:admin alice:secret123

use std::sync::Arc;

use hena_auth::auth::{PasswordHasher, TokenService};
use hena_auth::config::Config;
use hena_auth::error::AuthError;
use hena_auth::service::AuthService;
use hena_auth::storage::Storage;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = Config::load()?;
    let storage = Storage::open(config.data_dir())?;
    let tokens = TokenService::new(
        config.jwt_secret.as_bytes(),
        config.jwt_algorithm,
        config.token_ttl()?,
    )?;
    let auth = AuthService::new(Arc::new(storage.clone()), tokens, PasswordHasher::new(config.bcrypt_cost));

    let mut created = 0;
    for pair in std::env::args().skip(1) {
        let Some((username, password)) = pair.split_once(':') else {
            anyhow::bail!("expected username:password, got {pair:?}");
        };
        match auth.register(Some(username), password) {
            Ok(_) => {
                created += 1;
                println!("✅ created {username}");
            }
            Err(AuthError::UsernameTaken) => println!("skipped {username} (exists)"),
            Err(e) => return Err(e.into()),
        }
    }

    storage.flush()?;
    println!("✅ {created} account(s) created, {} in store", storage.user_count());
    Ok(())
}

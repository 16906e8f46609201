//! Seed the database with a demo salon.
//!
//! Creates the `demo` barbershop (serving both audiences, 50 credits) and its
//! operator `demo@salon.com` / `demo123`. Running it twice is a no-op.

use tracing::info;

use style_preview_core::Email;
use style_preview_server::services::auth::{AuthError, AuthService, SignupRequest};
use style_preview_server::store::Stores;

use super::{CommandError, connect};

const DEMO_EMAIL: &str = "demo@salon.com";
const DEMO_PASSWORD: &str = "demo123";
const DEMO_SLUG: &str = "demo";
const DEMO_CREDITS: i32 = 50;

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error(transparent)]
    Connect(#[from] CommandError),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// Create the demo salon and operator unless they already exist.
pub async fn demo_salon() -> Result<(), SeedError> {
    let pool = connect().await?;
    let stores = Stores::postgres(&pool);

    let email = Email::parse(DEMO_EMAIL).map_err(AuthError::from)?;
    if stores
        .users
        .get_by_email(&email)
        .await
        .map_err(AuthError::from)?
        .is_some()
    {
        info!(email = DEMO_EMAIL, "Demo operator already exists, skipping");
        return Ok(());
    }
    if stores
        .tenants
        .get_by_slug(DEMO_SLUG)
        .await
        .map_err(AuthError::from)?
        .is_some()
    {
        info!(slug = DEMO_SLUG, "Demo salon already exists, skipping");
        return Ok(());
    }

    let request = SignupRequest {
        email: Some(DEMO_EMAIL.to_owned()),
        password: Some(DEMO_PASSWORD.to_owned()),
        name: Some("Demo Salon Owner".to_owned()),
        role: Some("salon".to_owned()),
        salon_slug: Some(DEMO_SLUG.to_owned()),
        salon_name: Some("Demo Salon".to_owned()),
        salon_type: Some("barbershop".to_owned()),
        salon_services: Some("both".to_owned()),
    };

    let user = AuthService::new(stores.users.as_ref(), stores.tenants.as_ref())
        .signup(&request, DEMO_CREDITS)
        .await?;

    info!("Demo salon seeded!");
    info!("  Salon: {} ({} credits)", DEMO_SLUG, DEMO_CREDITS);
    info!("  Login: {} / {}", DEMO_EMAIL, DEMO_PASSWORD);
    info!("  User ID: {}", user.id);
    Ok(())
}

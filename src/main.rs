#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use crate::authorization::AuthGateLayer;
use shuttle_runtime::{CustomError, SecretStore};

mod authorization;
mod basic;
mod credentials;
mod error;
mod front;
mod logging;

#[expect(clippy::unused_async)]
#[shuttle_runtime::main]
async fn axum(#[shuttle_runtime::Secrets] secrets: SecretStore) -> shuttle_axum::ShuttleAxum {
    logging::init_logging().map_err(|e| CustomError::msg(format!("{e:?}")))?;
    let gate =
        AuthGateLayer::from_secrets(&secrets).map_err(|e| CustomError::msg(format!("{e:?}")))?;

    Ok(front::router(gate).into())
}

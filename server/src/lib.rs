pub mod config;
pub mod download;
pub mod error;
pub mod routes;
pub mod state;

use rocket::figment::Figment;
use rocket::{routes, Build, Rocket};

pub use state::AppState;

pub fn build(state: AppState, figment: Figment) -> Rocket<Build> {
    rocket::custom(figment).manage(state).mount(
        "/",
        routes![
            routes::transfers::upload,
            routes::transfers::meta,
            routes::transfers::file,
            routes::transfers::unlock,
            routes::transfers::revoke,
            routes::devices::list,
            routes::devices::register,
            routes::devices::notify,
            routes::devices::pending,
            routes::devices::clear,
        ],
    )
}

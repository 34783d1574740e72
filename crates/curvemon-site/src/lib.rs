//! curvemon-site - Static responder for the dashboard bundle.
//!
//! The built frontend is preloaded into memory once per process and served
//! either through API Gateway proxy events ([`StaticSite::handle_event`]) or
//! through a local axum server ([`run_server`]). Both paths share the same
//! routing rules:
//!
//! - `GET`/`HEAD` only, anything else is `405`
//! - `/config.js` is generated from `STREAM_URL` / `APP_ENV`
//! - unknown route-like paths fall back to `index.html`
//! - `HEAD` keeps status and headers and drops the body

mod bundle;
mod config;
mod error;
mod gateway;
mod mime;
mod package;
mod responder;
mod response;
mod runtime_config;
mod server;

pub use bundle::{AssetBundle, INDEX_PATH};
pub use config::SiteConfig;
pub use error::{SiteError, SiteResult};
pub use gateway::{GatewayEvent, GatewayResponse, HttpContext, RequestContext};
pub use mime::{cache_control_for, content_type_for, is_binary};
pub use package::{prepare_bundle, PackageOptions};
pub use responder::{StaticSite, CONFIG_SCRIPT_PATH};
pub use response::{ResponseBody, SiteResponse};
pub use runtime_config::RuntimeConfig;
pub use server::{create_router, run_server};

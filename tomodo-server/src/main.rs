use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::{routing::get, Router};
use structopt::StructOpt;
use tomodo_mem_store::MemStore;

mod error;
mod extractors;
mod handlers;
mod history;
mod presence;
mod rooms;
mod social;

pub use error::Error;
pub use presence::Presence;
pub use rooms::{ConnId, Rooms};

use extractors::{AppState, Store, Verifier};

#[derive(Debug, StructOpt)]
#[structopt(name = "tomodo-server", about = "Realtime sync server for shared to-do lists")]
struct Opt {
    /// Address to listen on
    #[structopt(long, default_value = "127.0.0.1:3000")]
    bind: SocketAddr,
}

fn app(store: Store, verifier: Verifier) -> Router {
    let state = AppState {
        store,
        verifier,
        presence: Presence::new(),
        rooms: Rooms::new(),
    };
    Router::new()
        .route("/ws", get(handlers::realtime_feed))
        .route("/api/lists/:list/last-activity", get(handlers::last_activity))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let opt = Opt::from_args();

    // standalone mode: the document store and token service run in-process
    let mem = Arc::new(MemStore::new());
    let store: Store = mem.clone();
    let verifier: Verifier = mem;
    let app = app(store, verifier);

    tracing::info!("listening on {}", opt.bind);
    axum::Server::bind(&opt.bind)
        .serve(app.into_make_service())
        .await
        .context("serving axum webserver")
}

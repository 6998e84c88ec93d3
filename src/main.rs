use std::cell::RefCell;
use std::rc::Rc;

use borderd_rest::config::Config;
use borderd_rest::mesh::MeshCache;
use borderd_rest::server::reactor;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let cfg = Config::load()?;

    // The control-protocol client updates this cache as the radio stack
    // reports changes; until it attaches, the REST interface serves the
    // detached snapshot.
    let mesh = Rc::new(RefCell::new(MeshCache::detached()));

    reactor::run(&cfg, mesh)
}

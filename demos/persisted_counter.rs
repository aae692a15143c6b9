//! Counter whose value survives remounts, backed by a sled database.
//!
//! ```text
//! RUST_LOG=tincache=trace cargo run --example persisted_counter
//! ```

use std::sync::Arc;
use tincache::{CacheConfig, Cached, CachedHook, Component, Hook, SledStore};
use tracing_subscriber::EnvFilter;

fn counter_view(hook: &CachedHook) -> tincache::Result<()> {
    let (count, set_count, _invalidate) = hook.use_state(0i64)?;
    println!("   Count: {count}");
    if count < 3 {
        set_count.update(|n| *n += 1);
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Persisted Counter ===\n");

    let db_path = std::env::temp_dir().join("tincache-demo").join("counter.sled");
    let store = Arc::new(SledStore::open(&db_path)?);
    println!("1. Store opened at {}", db_path.display());

    // One-second expiry units; the count is forgotten after 30 idle seconds.
    let cached = Cached::configure(
        store,
        CacheConfig::new("demo:counter")
            .with_ttl(30.0)
            .with_ttl_unit_ms(1_000),
    )?;
    let counter = cached.wrap(Hook::State);

    println!("\n2. Mounting and rendering until the count settles");
    let component = Component::new();
    component.render(|| counter_view(&counter))?;
    while component.needs_render() {
        component.render(|| counter_view(&counter))?;
    }

    println!("\n3. Remounting: the count resumes from the store");
    component.unmount();
    component.render(|| counter_view(&counter))?;

    println!("\n4. Invalidating: the next cold start begins at 0");
    cached.invalidate();

    println!("\n✓ Done");
    Ok(())
}

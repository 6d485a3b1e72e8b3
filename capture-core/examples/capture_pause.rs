use capture_core::{CaptureOptions, DynObject, Target, args, capture, shared};
use serde_json::json;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("capture_core=debug")
        .init();

    let shape = DynObject::new()
        .with_readonly("sides", 4)
        .with_method("describe", |this, _| {
            Ok(json!(format!("{} sides", this.get("sides")?)))
        });
    let square = DynObject::new()
        .with_prototype(shape)
        .with_value("size", 2);

    let source = shared(square);
    let facade = capture(source.clone(), CaptureOptions::immediate());

    // 立即模式：记录并同步执行
    let out = facade.call("describe", args![])?;
    println!("describe -> {out:?}, recorded={}", facade.queue_len());

    facade.pause_capture();
    facade.set("size", 3)?;
    println!("paused write applied: size={}", facade.get("size")?);
    println!("recorded while paused={}", facade.queue_len());
    facade.resume_capture();

    facade.set("size", 4)?;
    println!("recorded after resume={}", facade.queue_len());

    // 只读成员在执行时被拒绝
    facade.set("sides", 5).unwrap_or_else(|err| {
        println!("write rejected: {err}");
        None
    });

    source.write().map_err(|_| anyhow::anyhow!("source poisoned"))?.set("size", json!(1))?;
    match facade.execute_all() {
        Ok(results) => println!("replayed: {results:?}"),
        Err(err) => println!("replay stopped: {err}"),
    }
    println!("final size={}", facade.get("size")?);
    Ok(())
}

use capture_core::{
    CaptureError, CaptureOptions, DynObject, MemberKind, Target, Value, args, deferred, shared,
};
use serde_json::json;

fn counter() -> DynObject {
    DynObject::new()
        .with_value("x", 1)
        .with_method("inc", |this, args| {
            let n: i64 = args.decode("inc", 0)?;
            let x = this.get("x")?.as_i64().unwrap_or_default() + n;
            this.set("x", json!(x))
        })
}

fn main() -> Result<(), CaptureError> {
    let source = shared(counter());
    let batch = deferred(source.clone(), CaptureOptions::default());

    for (name, kind) in batch.members() {
        let label = match kind {
            MemberKind::Method => "method",
            MemberKind::Data { .. } => "data",
        };
        println!("member {name}: {label}");
    }

    batch.call("inc", args![5])?;
    batch.call("inc", args![5])?;
    batch.set("x", 100)?;

    println!("before execute_all: x={}", batch.get("x")?);
    for record in batch.pending() {
        println!("  pending {}", serde_json::to_string(&record)?);
    }

    let results: Vec<Value> = batch.execute_all()?;
    println!("results: {results:?}");
    println!("after execute_all: x={}", batch.get("x")?);

    batch.clear_queue();
    println!("queue cleared, pending={}", batch.queue_len());
    Ok(())
}

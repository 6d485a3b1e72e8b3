use capture_core::Target;
use capture_macros::capturable;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Address {
    city: String,
}

#[capturable]
struct Profile {
    age: u32,
    #[capture(readonly)]
    id: String,
    #[capture(skip)]
    #[allow(dead_code)]
    cache: Vec<u8>,
    #[capture(rename = "displayName")]
    display_name: String,
    address: Address,
}

fn main() {
    let mut p = Profile {
        age: 30,
        id: "p-1".into(),
        cache: Vec::new(),
        display_name: "Ann".into(),
        address: Address { city: "Oslo".into() },
    };

    let names: Vec<_> = p.members().into_iter().map(|d| d.name).collect();
    assert_eq!(names, vec!["age", "id", "displayName", "address"]);

    // 字段读写走 serde
    p.set("age", serde_json::json!(31)).unwrap();
    assert_eq!(p.age, 31);
    assert!(p.set("id", serde_json::json!("p-2")).is_err());
    assert_eq!(p.get("displayName").unwrap(), serde_json::json!("Ann"));
    assert!(p.get("cache").is_err());

    p.set("address", serde_json::json!({ "city": "Bergen" })).unwrap();
    assert_eq!(p.address, Address { city: "Bergen".into() });
    assert!(p.set("address", serde_json::json!(1)).is_err());
}

use capture_core::{Target, args};
use capture_macros::{capturable, capturable_methods};

#[capturable(methods)]
struct Shape {
    name: String,
}

#[capturable_methods]
impl Shape {
    pub fn rename(&mut self, name: String) {
        self.name = name;
    }
}

#[capturable]
struct Square {
    side: f64,
    #[capture(flatten)]
    base: Shape,
}

fn main() {
    let mut sq = Square {
        side: 2.0,
        base: Shape { name: "sq".into() },
    };

    let members: Vec<_> = sq.members().into_iter().map(|d| (d.name, d.depth)).collect();
    assert_eq!(
        members,
        vec![
            ("side".to_string(), 0),
            ("name".to_string(), 1),
            ("rename".to_string(), 1)
        ]
    );

    sq.call("rename", args!["box"]).unwrap();
    assert_eq!(sq.get("name").unwrap(), serde_json::json!("box"));
}

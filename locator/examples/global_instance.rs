use fibre_locator::{factory, global, service, Factories};
use serde_json::json;

fn main() {
  let mut factories = Factories::new();
  factories.insert(
    "config".to_string(),
    factory(|_| Ok(json!({ "app": { "name": "demo", "workers": 4 } }))),
  );

  global::initialize(Some(factories), false).unwrap();

  // A second initialization is refused unless explicitly allowed.
  match global::initialize(None, false) {
    Ok(_) => unreachable!("the global container was already initialized"),
    Err(err) => println!("Second initialize refused: {}", err),
  }

  println!("app.name    = {}", service!("config.app.name", json!(null)));
  println!("app.workers = {}", service!("config.app.workers", json!(1)));
  println!("app.region  = {}", service!("config.app.region", json!("default")));
}

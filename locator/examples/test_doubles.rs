use fibre_locator::Container;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};

// Counts how many mailer instances were built.
static MAILERS_BUILT: AtomicUsize = AtomicUsize::new(0);

fn main() {
  let container: Container = Container::builder()
    .value("smtp", json!({ "host": "smtp.example.com", "port": 587 }))
    .factory("mailer", |c| {
      let host = c.get_or("smtp.host", json!("localhost"))?;
      let id = MAILERS_BUILT.fetch_add(1, Ordering::SeqCst);
      println!("Building mailer #{} for {}", id, host);
      Ok(json!({ "id": id, "host": host }))
    })
    .build();

  println!("--- Production wiring ---");
  println!("mailer.host = {}", container.get_or("mailer.host", json!(null)).unwrap());

  println!("\n--- Swapping in a test double ---");
  container.override_service("mailer", json!({ "id": "fake", "host": "nowhere" }));
  println!("mailer.host = {}", container.get_or("mailer.host", json!(null)).unwrap());

  println!("\n--- Restoring ---");
  container.restore();
  // The original instance comes back; the factory is not called again.
  println!("mailer.id = {}", container.get_or("mailer.id", json!(null)).unwrap());
  assert_eq!(MAILERS_BUILT.load(Ordering::SeqCst), 1);

  println!("\n--- Recreating ---");
  container.recreate("mailer").unwrap();
  println!("mailer.id = {}", container.get_or("mailer.id", json!(null)).unwrap());
  assert_eq!(MAILERS_BUILT.load(Ordering::SeqCst), 2);
  container.restore();
}

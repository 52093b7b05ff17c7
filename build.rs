const COMMANDS: &[&str] = &[
  "initialize",
  "is_initialized",
  "get_status",
  "purchase",
  "restore_purchase",
  "has_purchased",
  "activate",
];

fn main() {
  tauri_plugin::Builder::new(COMMANDS).build();
}

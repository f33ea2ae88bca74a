use std::io::Write;

use hrkit::config::{Initializer, Running};

pub const CONFIG: &str = r#"
session:
  ordering: serialized
seed:
  accounts:
    - uid: admin1
      email: admin@example.com
      password: secret1
    - uid: emp1
      email: eve@example.com
      password: secret2
    - uid: ghost
      email: ghost@example.com
      password: secret3
    - uid: norole1
      email: nora@example.com
      password: secret4
  documents:
    users:
      admin1:
        firstName: Ada
        lastName: Admin
        email: admin@example.com
        role: Admin
      emp1:
        firstName: Eve
        lastName: Employee
        email: eve@example.com
        role: Employee
      norole1:
        firstName: Nora
        lastName: Norole
        email: nora@example.com
"#;

/// Write `extra` after the shared config into a temp file and launch from it.
pub async fn launch(extra: &str) -> Running {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{}{}", CONFIG, extra).unwrap();

    let initializer = Initializer::load_config_file(file.path()).await.unwrap();
    let running = initializer.launch().await.unwrap();
    running.client().resolved().await.unwrap();
    running
}

use gitolite_mover::gitolite_mover_main;
use std::process::exit;

#[tokio::main]
async fn main() {
    eprintln!(concat!(
        env!("CARGO_PKG_NAME"),
        " ",
        env!("CARGO_PKG_VERSION")
    ));
    match gitolite_mover_main().await {
        Ok(_) => {
            exit(0);
        }
        Err(e) => {
            eprintln!("ERROR: {e}");
            exit(e.exit_code());
        }
    };
}

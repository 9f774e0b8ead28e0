#[tokio::main]
async fn main() {
    if let Err(e) = class_booking_backend::run().await {
        eprintln!("fatal: {}", e);
        std::process::exit(1);
    }
}

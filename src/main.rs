#[tokio::main]
async fn main() {
    todoer::run().await;
}

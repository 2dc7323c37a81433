#[actix_web::main]
async fn main() -> std::io::Result<()> {
    flatten_select_lib::run().await
}

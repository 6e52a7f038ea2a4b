#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    markdown_pdf_server::run().await
}

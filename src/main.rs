use newsletter_lists::app::{
    load_configuration,
    setup_tracing,
    NewsletterApp,
};

#[actix_web::main]
async fn main() -> Result<(), anyhow::Error> {
    setup_tracing("newsletter-lists".into(), "info".into(), std::io::stdout);
    let configuration = load_configuration()?;
    tracing::info!("starting with configuration: {:?}", configuration);
    let app = NewsletterApp::from(configuration).await?;
    tracing::info!("listening on port {}", app.port);
    app.server.await?;
    Ok(())
}

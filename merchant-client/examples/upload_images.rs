// merchant-client/examples/upload_images.rs
// 上传图片示例：上传本地图片，可选地写回商品

use std::sync::Arc;

use merchant_client::image::TracingNotifier;
use merchant_client::logger::init_logger;
use merchant_client::{
    ClientConfig, ImageFile, ImageUploader, NetworkHttpClient, ProductApi, ProductImageForm,
    ProductUpdate,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logger("info", false)?;

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        println!("Usage: {} [--product <id>] <image>...", args[0]);
        println!("  Example: {} --product p1 cover.jpg side.png", args[0]);
        return Ok(());
    }

    let mut product_id = None;
    let mut paths = Vec::new();
    let mut rest = args[1..].iter();
    while let Some(arg) = rest.next() {
        if arg == "--product" {
            product_id = rest.next().cloned();
        } else {
            paths.push(arg.clone());
        }
    }

    let config = ClientConfig::from_env();
    let http = NetworkHttpClient::new(&config)?;
    let api = ProductApi::new(http);

    // 编辑已有商品时先载入原有图片
    let (form, existing) = match &product_id {
        Some(id) => {
            let product = api.get_product(id).await?;
            (ProductImageForm::from_product(&product), product.images)
        }
        None => (ProductImageForm::new(), Vec::new()),
    };
    let form = Arc::new(form);

    let uploader = ImageUploader::from_config(&config, Arc::new(TracingNotifier), form.clone())?
        .with_images(&existing);

    let mut files = Vec::new();
    for path in &paths {
        match ImageFile::from_path(path).await {
            Ok(file) => files.push(file),
            Err(e) => tracing::error!(path = %path, error = %e, "Cannot read file"),
        }
    }

    let Some(batch) = uploader.select_files(files) else {
        tracing::warn!("No valid images selected");
        return Ok(());
    };
    let report = batch.wait().await;

    for url in &report.uploaded {
        println!("{}", url);
    }
    for failed in &report.failed {
        eprintln!("{}: {}", failed.file_name, failed.message);
    }

    if let Some(id) = product_id {
        let product = api
            .update_product(&id, &form.fill_update(ProductUpdate::default()))
            .await?;
        tracing::info!(product_id = %product.id, images = product.images.len(), "Product updated");
    }

    Ok(())
}

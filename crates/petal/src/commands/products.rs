//! Product command handlers.

use std::path::Path;

use bytes::Bytes;
use tabled::Tabled;

use petal_core::{
    Backoffice, MultipartPart, NewProduct, PriceChange, Product, ProductFilter, ProductKind,
    ProductProperties, StatusFlags,
};

use crate::cli::{GlobalOpts, ProductKindArg, ProductsArgs, ProductsCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct ProductRow {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "Available")]
    available: String,
    #[tabled(rename = "Created")]
    created: String,
}

impl ProductRow {
    fn new(p: &Product, color: bool) -> Self {
        Self {
            id: p.id,
            title: p.title.clone(),
            kind: p.kind.map_or_else(|| "-".into(), |k| k.to_string()),
            price: p.price.map_or_else(|| "-".into(), util::money),
            available: if p.is_available {
                "yes".into()
            } else {
                output::dim_text("no", color)
            },
            created: util::datetime(p.created_at.as_ref()),
        }
    }
}

fn detail(p: &Product) -> String {
    let mut lines = vec![
        format!("ID:        {}", p.id),
        format!("Title:     {}", p.title),
        format!(
            "Type:      {}",
            p.kind.map_or_else(|| "-".into(), |k| k.to_string())
        ),
        format!(
            "Price:     {}",
            p.price.map_or_else(|| "-".into(), util::money)
        ),
        format!("Available: {}", p.is_available),
        format!("Created:   {}", util::datetime(p.created_at.as_ref())),
    ];
    if let Some(image) = &p.image {
        lines.push(format!("Image:     {image}"));
    }
    for extra in p.images.iter().filter(|i| Some(*i) != p.image.as_ref()) {
        lines.push(format!("           {extra}"));
    }
    lines.join("\n")
}

impl From<ProductKindArg> for ProductKind {
    fn from(arg: ProductKindArg) -> Self {
        match arg {
            ProductKindArg::Vitrina => ProductKind::Vitrina,
            ProductKindArg::Catalog => ProductKind::Catalog,
        }
    }
}

// ── Upload helpers ──────────────────────────────────────────────────

fn image_mime(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        _ => None,
    }
}

fn video_mime(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "mp4" => Some("video/mp4"),
        "mov" => Some("video/quicktime"),
        "webm" => Some("video/webm"),
        _ => None,
    }
}

async fn read_part(
    path: &Path,
    field: &str,
    mime: fn(&Path) -> Option<&'static str>,
) -> Result<MultipartPart, CliError> {
    let mime = mime(path).ok_or_else(|| CliError::Validation {
        field: "files".into(),
        reason: format!("{} is not a supported file type", path.display()),
    })?;
    let file_name = path
        .file_name()
        .map_or_else(String::new, |n| n.to_string_lossy().into_owned());
    let data = tokio::fs::read(path).await?;
    Ok(MultipartPart::file(field, file_name, Bytes::from(data)).with_mime(mime))
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    backoffice: &Backoffice,
    args: ProductsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let color = output::should_color(&global.color);
    let catalog = backoffice.products();

    match args.command {
        ProductsCommand::List {
            kind,
            available,
            limit,
            offset,
        } => {
            let filter = ProductFilter {
                kind: kind.map(ProductKind::from),
                is_available: available,
                limit: Some(limit),
                offset: Some(offset),
            };
            let page = catalog.list(filter).await?;
            let out = output::render_list(
                &global.output,
                &page.products,
                |p| ProductRow::new(p, color),
                |p| p.id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            if let Some(footer) = util::page_footer(page.pagination.as_ref()) {
                output::note(&output::dim_text(&footer, color), global.quiet);
            }
            Ok(())
        }

        ProductsCommand::Get { id } => {
            let product = catalog.get(id).await?;
            let out = output::render_single(&global.output, &product, detail, |p| {
                p.id.to_string()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ProductsCommand::SetStatus {
            id,
            active,
            in_stock,
            ready,
        } => {
            if active.is_none() && in_stock.is_none() && ready.is_none() {
                return Err(CliError::Validation {
                    field: "status".into(),
                    reason: "pass at least one of --active, --in-stock, --ready".into(),
                });
            }
            let flags = StatusFlags {
                active,
                in_stock,
                is_ready: ready,
            };
            catalog.set_status(id, flags).await?;
            output::note(&format!("Product {id} updated"), global.quiet);
            Ok(())
        }

        ProductsCommand::Upload { files } => {
            let mut parts = Vec::with_capacity(files.len());
            for path in &files {
                parts.push(read_part(path, "files[]", image_mime).await?);
            }
            let urls = catalog.upload_images(parts).await?;
            let out = output::render_single(
                &global.output,
                &urls,
                |u| u.join("\n"),
                |u| u.join("\n"),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ProductsCommand::UploadVideo { file } => {
            let part = read_part(&file, "file", video_mime).await?;
            let url = catalog.upload_video(part).await?;
            output::print_output(&url, global.quiet);
            Ok(())
        }

        ProductsCommand::Create {
            kind,
            title,
            price,
            percent,
            images,
            video,
            width,
            height,
            owner_id,
        } => {
            let product = NewProduct {
                title,
                price,
                percent,
                images,
                video,
                width,
                height,
                owner_id,
                ..NewProduct::new(ProductKind::from(kind))
            };
            match catalog.create(&product).await? {
                Some(id) => {
                    output::print_output(&id.to_string(), global.quiet);
                }
                None => output::note("Product created", global.quiet),
            }
            Ok(())
        }

        ProductsCommand::Delete { id } => {
            if !util::confirm(
                &format!("Delete product {id}? This cannot be undone."),
                global.yes,
            )? {
                return Ok(());
            }
            catalog.delete(id).await?;
            output::note(&format!("Product {id} deleted"), global.quiet);
            Ok(())
        }

        ProductsCommand::SetPrice { id, price, percent } => {
            catalog.set_price(id, PriceChange { price, percent }).await?;
            output::note(&format!("Product {id} price updated"), global.quiet);
            Ok(())
        }

        ProductsCommand::SetProps { id, width, height } => {
            catalog
                .update_properties(id, &ProductProperties { width, height })
                .await?;
            output::note(&format!("Product {id} updated"), global.quiet);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_types_by_extension() {
        assert_eq!(image_mime(Path::new("rose.JPG")), Some("image/jpeg"));
        assert_eq!(image_mime(Path::new("a/b/tulip.webp")), Some("image/webp"));
        assert_eq!(image_mime(Path::new("notes.txt")), None);
        assert_eq!(image_mime(Path::new("no_extension")), None);
        assert_eq!(video_mime(Path::new("bouquet.MP4")), Some("video/mp4"));
        assert_eq!(video_mime(Path::new("rose.jpg")), None);
    }
}

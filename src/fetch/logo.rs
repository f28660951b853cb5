use image::RgbImage;
use log::warn;
use reqwest::Url;

use crate::error::AppError;

use super::quote::ProviderClient;
use super::FetchResult;

/// Logos are downsampled to fit the matrix cell reserved for them.
pub const LOGO_SIZE: u32 = 8;

/// Download and downsample a company logo. Logo failures degrade the display
/// rather than the ticker: every error is logged and swallowed.
pub fn fetch_logo(provider: &ProviderClient, symbol: &str, url: &str) -> Option<RgbImage> {
    match try_fetch_logo(provider, url) {
        Ok(logo) => Some(logo),
        Err(err) => {
            warn!("Unable to fetch logo for {}: {}", symbol, err);
            None
        }
    }
}

fn try_fetch_logo(provider: &ProviderClient, url: &str) -> FetchResult<RgbImage> {
    let url = Url::parse(url)
        .map_err(|err| AppError::message(format!("Invalid logo URL `{}`: {}", url, err)))?;

    let response = provider.http().get(url).send()?;
    if !response.status().is_success() {
        return Err(AppError::message(format!(
            "Logo request failed with status {}",
            response.status()
        )));
    }

    let bytes = response.bytes()?;
    downsample_logo(&bytes)
}

/// Decode raw image bytes and shrink them to fit within the logo cell,
/// preserving aspect ratio, in 8-bit RGB.
pub fn downsample_logo(bytes: &[u8]) -> FetchResult<RgbImage> {
    let decoded = image::load_from_memory(bytes)?;
    if decoded.width() <= LOGO_SIZE && decoded.height() <= LOGO_SIZE {
        // Already fits; thumbnail() would scale small art up to the box.
        return Ok(decoded.to_rgb8());
    }
    Ok(decoded.thumbnail(LOGO_SIZE, LOGO_SIZE).to_rgb8())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use image::{DynamicImage, ImageOutputFormat, RgbImage};

    use super::*;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(
            width,
            height,
            image::Rgb([200, 40, 40]),
        ));
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)
            .expect("encode test image");
        bytes
    }

    #[test]
    fn downsamples_wide_logo_preserving_aspect() {
        let logo = downsample_logo(&png_bytes(32, 16)).unwrap();

        assert_eq!(logo.width(), 8);
        assert_eq!(logo.height(), 4);
    }

    #[test]
    fn small_logo_is_not_upscaled() {
        let logo = downsample_logo(&png_bytes(4, 4)).unwrap();

        assert_eq!(logo.width(), 4);
        assert_eq!(logo.height(), 4);
    }

    #[test]
    fn rejects_undecodable_bytes() {
        let err = downsample_logo(b"not an image").unwrap_err();
        assert!(matches!(err, AppError::Image(_)));
    }

    #[test]
    fn url_without_scheme_is_absorbed() {
        let provider = ProviderClient::new().unwrap();

        // Parsing fails before any request goes out.
        let logo = fetch_logo(&provider, "AAPL", "logos.example.com/aapl.png");

        assert!(logo.is_none());
    }
}

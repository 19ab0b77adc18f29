//! Image output

use crate::geometry::*;
use crate::pbrt::*;
use byteorder::{LittleEndian, WriteBytesExt};
use exr::prelude::{
    Encoding, Image, ImageAttributes, IntegerBounds, Layer, LayerAttributes, SpecificChannels, Vec2, WritableImage,
};
use image::{ImageBuffer, ImageFormat, Rgb};
use regex::Regex;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::sync::OnceLock;

/// Output formats supported by `write_image()`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// OpenEXR, linear half/float data.
    Exr,

    /// Portable FloatMap, linear 32-bit floats.
    Pfm,

    /// 8-bit gamma corrected formats written through the `image` crate.
    EightBit(ImageFormat),
}

impl OutputFormat {
    /// Determine the output format from a file path's extension.
    ///
    /// * `path` - The file path.
    pub fn from_path(path: &str) -> Result<Self, String> {
        match get_extension_from_filename(path).map(|e| e.to_ascii_lowercase()) {
            Some(e) if e == ".exr" => Ok(Self::Exr),
            Some(e) if e == ".pfm" => Ok(Self::Pfm),
            Some(e) if e == ".png" => Ok(Self::EightBit(ImageFormat::Png)),
            Some(e) if e == ".tga" => Ok(Self::EightBit(ImageFormat::Tga)),
            Some(e) => Err(format!("Extension {e} is not supported")),
            None => Err(format!("Can't determine file type from suffix of filename {path}")),
        }
    }
}

/// Write the output image to given path.
///
/// * `path`          - Output file path.
/// * `rgb`           - Floating point RGB pixel data in scanline order.
/// * `output_bounds` - The bounds for the image output.
pub fn write_image(path: &str, rgb: &[Float], output_bounds: &Bounds2i) -> Result<(), String> {
    let resolution = output_bounds.diagonal();
    let res_x = resolution.x as usize;
    let res_y = resolution.y as usize;
    if rgb.len() != 3 * res_x * res_y {
        return Err(format!(
            "Pixel data has {} values, expected {} for {res_x}x{res_y}",
            rgb.len(),
            3 * res_x * res_y
        ));
    }

    info!("Writing image {path} with resolution {res_x}x{res_y}");

    match OutputFormat::from_path(path)? {
        OutputFormat::Exr => write_exr(path, rgb, res_x, res_y),
        OutputFormat::Pfm => write_pfm(path, rgb, res_x, res_y),
        OutputFormat::EightBit(format) => write_8_bit(path, rgb, res_x, res_y, format),
    }
}

/// Returns regular expression for extracting the file extension: the last period followed by no periods or slashes.
fn regex_file_ext() -> &'static Regex {
    static DATA: OnceLock<Regex> = OnceLock::new();
    DATA.get_or_init(|| Regex::new(r"(\.[^./\\]+)$").unwrap_or_else(|e| panic!("invalid extension regex: {e}")))
}

/// Retrieve the extension from a file path.
///
/// * `path` - The file path.
fn get_extension_from_filename(path: &str) -> Option<&str> {
    regex_file_ext().captures(path).and_then(|c| c.get(1)).map(|m| m.as_str())
}

/// Writes the image in OpenEXR format.
///
/// * `path`  - Output file path.
/// * `rgb`   - Floating point RGB pixel data.
/// * `res_x` - X resolution.
/// * `res_y` - Y resolution.
fn write_exr(path: &str, rgb: &[Float], res_x: usize, res_y: usize) -> Result<(), String> {
    let size = Vec2(res_x, res_y);

    let layer = Layer::new(
        size,
        LayerAttributes::named("render"),
        Encoding::SMALL_LOSSLESS,
        SpecificChannels::rgb(|pos: Vec2<usize>| {
            let offset = 3 * (pos.1 * res_x + pos.0);
            (rgb[offset], rgb[offset + 1], rgb[offset + 2])
        }),
    );

    let attributes = ImageAttributes::new(IntegerBounds::from_dimensions(size));
    Image::empty(attributes)
        .with_layer(layer)
        .write()
        .to_file(path)
        .map_err(|err| format!("Error saving output image {path}: {err}"))
}

/// Writes the image in an 8-bit image format after gamma correction.
///
/// * `path`   - Output file path.
/// * `rgb`    - Floating point RGB pixel data.
/// * `res_x`  - X resolution.
/// * `res_y`  - Y resolution.
/// * `format` - Image format.
fn write_8_bit(path: &str, rgb: &[Float], res_x: usize, res_y: usize, format: ImageFormat) -> Result<(), String> {
    let imgbuf = ImageBuffer::from_fn(res_x as u32, res_y as u32, |x, y| {
        let offset = 3 * (y as usize * res_x + x as usize);
        Rgb([
            clamp_byte(rgb[offset]),
            clamp_byte(rgb[offset + 1]),
            clamp_byte(rgb[offset + 2]),
        ])
    });

    imgbuf
        .save_with_format(path, format)
        .map_err(|err| format!("Error saving output image {path}: {err}"))
}

/// Writes the image in PFM (Portable FloatMap) format, little endian, rows ordered bottom to top.
///
/// * `path`  - Output file path.
/// * `rgb`   - Floating point RGB pixel data.
/// * `res_x` - X resolution.
/// * `res_y` - Y resolution.
fn write_pfm(path: &str, rgb: &[Float], res_x: usize, res_y: usize) -> Result<(), String> {
    let err = |e: std::io::Error| format!("Error saving output image {path}: {e}");

    let file = File::create(path).map_err(err)?;
    let mut writer = BufWriter::new(file);

    // A negative scale marks little endian data.
    write!(writer, "PF\n{res_x} {res_y}\n-1\n").map_err(err)?;
    for y in (0..res_y).rev() {
        for v in &rgb[3 * y * res_x..3 * (y + 1) * res_x] {
            writer.write_f32::<LittleEndian>(*v).map_err(err)?;
        }
    }
    writer.flush().map_err(err)
}

/// Clamp floating point value to 8-bit range [0, 255] after gamma correction.
///
/// * `v` - Value to clamp.
#[inline]
fn clamp_byte(v: Float) -> u8 {
    clamp(255.0 * gamma_correct(v) + 0.5, 0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_from_extension() {
        assert_eq!(OutputFormat::from_path("a/b.exr"), Ok(OutputFormat::Exr));
        assert_eq!(OutputFormat::from_path("render.PFM"), Ok(OutputFormat::Pfm));
        assert_eq!(
            OutputFormat::from_path("x.png"),
            Ok(OutputFormat::EightBit(ImageFormat::Png))
        );
        assert!(OutputFormat::from_path("x.jpg2").is_err());
        assert!(OutputFormat::from_path("noextension").is_err());
    }

    #[test]
    fn clamp_byte_range() {
        assert_eq!(clamp_byte(-1.0), 0);
        assert_eq!(clamp_byte(0.0), 0);
        assert_eq!(clamp_byte(1.0), 255);
        assert_eq!(clamp_byte(10.0), 255);
    }

    #[test]
    fn mismatched_pixel_count_is_an_error() {
        let bounds = Bounds2i::new(Point2i::new(0, 0), Point2i::new(2, 2));
        assert!(write_image("out.pfm", &[0.0; 3], &bounds).is_err());
    }

    #[test]
    fn writes_pfm_header_and_data() {
        let path = std::env::temp_dir().join("rtcore_image_io_test.pfm");
        let path = path.to_string_lossy().to_string();
        let bounds = Bounds2i::new(Point2i::new(0, 0), Point2i::new(2, 1));
        write_image(&path, &[0.0, 0.25, 0.5, 1.0, 2.0, 3.0], &bounds).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        let header = b"PF\n2 1\n-1\n";
        assert_eq!(&bytes[..header.len()], header);
        assert_eq!(bytes.len(), header.len() + 6 * 4);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn writes_exr_file() {
        let path = std::env::temp_dir().join("rtcore_image_io_test.exr");
        let path = path.to_string_lossy().to_string();
        let bounds = Bounds2i::new(Point2i::new(0, 0), Point2i::new(2, 2));
        let rgb: Vec<Float> = (0..12).map(|i| i as Float * 0.1).collect();
        let result: Result<(), String> = write_image(&path, &rgb, &bounds);
        assert!(result.is_ok());
        let bytes = std::fs::read(&path).unwrap();
        // OpenEXR magic number.
        assert_eq!(&bytes[..4], &[0x76, 0x2f, 0x31, 0x01]);
        let _ = std::fs::remove_file(&path);
    }
}

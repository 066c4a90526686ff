/// Content type detected from the leading bytes of a payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sniffed {
    /// A GIF, rendered through the compositor.
    Gif,
    /// Any other image format, rendered as a single still frame.
    Still(image::ImageFormat),
    /// Not an image.
    Unknown,
}

/// Detect the content type from magic bytes, never from a URL or file extension.
pub fn sniff(bytes: &[u8]) -> Sniffed {
    match image::guess_format(bytes) {
        Ok(image::ImageFormat::Gif) => Sniffed::Gif,
        Ok(format) => Sniffed::Still(format),
        Err(_) => Sniffed::Unknown,
    }
}

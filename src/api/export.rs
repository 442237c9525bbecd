//! PNG and SVG export of the plot.
//!
//! PNG is a snapshot of the last painted raster frame. SVG rebuilds the
//! current frame and serializes it, so both share one geometry source.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::PlotResult;
use crate::render::{RasterSnapshot, Renderer, SvgRenderer};

use super::PlotterEngine;

const FILE_STEM: &str = "ecuplot";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportFormat {
    Png,
    Svg,
}

impl ExportFormat {
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Svg => "svg",
        }
    }

    #[must_use]
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Svg => "image/svg+xml;charset=utf-8",
        }
    }
}

/// Download name such as `ecuplot-20250102-030405.svg`.
#[must_use]
pub fn export_file_name(format: ExportFormat, at: DateTime<Utc>) -> String {
    format!(
        "{FILE_STEM}-{}.{}",
        at.format("%Y%m%d-%H%M%S"),
        format.extension()
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SvgExport {
    pub file_name: String,
    pub markup: String,
}

impl SvgExport {
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        self.markup.as_bytes()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PngExport {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl PngExport {
    /// `data:image/png;base64,...` URL of the snapshot.
    #[must_use]
    pub fn data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            ExportFormat::Png.mime_type(),
            STANDARD.encode(&self.bytes)
        )
    }
}

impl<R: Renderer> PlotterEngine<R> {
    /// Serializes the current plot as a standalone SVG document.
    pub fn export_svg(&self) -> PlotResult<SvgExport> {
        let frame = self.build_frame()?;
        let mut svg = SvgRenderer::default();
        svg.render(&frame)?;
        let markup = svg.document()?;
        let file_name = export_file_name(ExportFormat::Svg, Utc::now());
        debug!(%file_name, bytes = markup.len(), "svg exported");
        Ok(SvgExport { file_name, markup })
    }

    /// Snapshots the last painted frame. Fails with `NoSurface` before the
    /// first paint.
    pub fn export_png(&self) -> PlotResult<PngExport>
    where
        R: RasterSnapshot,
    {
        let bytes = self.renderer.snapshot_png()?;
        let file_name = export_file_name(ExportFormat::Png, Utc::now());
        debug!(%file_name, bytes = bytes.len(), "png exported");
        Ok(PngExport { file_name, bytes })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::{ExportFormat, PngExport, export_file_name};

    #[test]
    fn file_names_carry_utc_timestamp() {
        let at = Utc
            .with_ymd_and_hms(2025, 1, 2, 3, 4, 5)
            .single()
            .expect("valid timestamp");
        assert_eq!(
            export_file_name(ExportFormat::Svg, at),
            "ecuplot-20250102-030405.svg"
        );
        assert_eq!(
            export_file_name(ExportFormat::Png, at),
            "ecuplot-20250102-030405.png"
        );
    }

    #[test]
    fn png_data_url_is_base64() {
        let export = PngExport {
            file_name: "plot.png".to_owned(),
            bytes: vec![0x89, b'P', b'N', b'G'],
        };
        assert_eq!(export.data_url(), "data:image/png;base64,iVBORw==");
    }
}

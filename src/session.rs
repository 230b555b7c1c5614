//! Selection lifecycle: decode completion routing, last-writer-wins, and
//! the export affordance.

use crate::assets::{ImageDecoder, PreparedImage};
use crate::compositor::Compositor;
use crate::config::FrameProfile;
use crate::encode::{encode_png, encode_png_data_url};
use crate::error::{RingframeError, RingframeResult};
use crate::render::{FrameRgba, RenderSurface};

/// Handle for one user selection. Tickets are ordered: issuing a new one
/// supersedes every earlier ticket.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SelectionTicket(u64);

/// What a completion did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// The decode was current; the photo was composited.
    Composited,
    /// A newer selection exists; this completion was discarded.
    Superseded,
}

/// Single-user compositing session.
///
/// All work is synchronous and single-threaded. Decodes that complete out
/// of band map onto the `begin_selection` / `complete_selection` split,
/// and completions for superseded tickets are ignored on arrival.
pub struct Session {
    compositor: Compositor,
    surface: Box<dyn RenderSurface>,
    decoder: Box<dyn ImageDecoder>,
    photo: Option<PreparedImage>,
    issued: u64,
    export_ready: bool,
}

impl Session {
    pub fn new(
        profile: FrameProfile,
        mut surface: Box<dyn RenderSurface>,
        decoder: Box<dyn ImageDecoder>,
    ) -> RingframeResult<Self> {
        let compositor = Compositor::new(profile)?;
        let size = compositor.profile().canvas_size;
        if surface.size() != (size, size) {
            return Err(RingframeError::validation(
                "surface does not match the profile canvas size",
            ));
        }

        surface.clear();
        Ok(Self {
            compositor,
            surface,
            decoder,
            photo: None,
            issued: 0,
            export_ready: false,
        })
    }

    /// Start a new selection. Export becomes unavailable until this (or a
    /// later) selection composites successfully.
    pub fn begin_selection(&mut self) -> SelectionTicket {
        self.issued += 1;
        self.export_ready = false;
        SelectionTicket(self.issued)
    }

    /// Deliver the selected file's bytes for `ticket`.
    ///
    /// A stale ticket is discarded without touching any state, so a slow
    /// early decode can never overwrite a faster later one. A failed
    /// decode of the current ticket leaves the canvas untouched and export
    /// unavailable; the error carries the user-facing message.
    #[tracing::instrument(skip(self, bytes), fields(ticket = ticket.0, len = bytes.len()))]
    pub fn complete_selection(
        &mut self,
        ticket: SelectionTicket,
        bytes: &[u8],
    ) -> RingframeResult<CompletionOutcome> {
        if ticket.0 != self.issued {
            tracing::debug!(current = self.issued, "discarding superseded completion");
            return Ok(CompletionOutcome::Superseded);
        }

        let photo = self.decoder.decode(bytes)?;
        self.photo = Some(photo);
        self.composite()?;
        Ok(CompletionOutcome::Composited)
    }

    /// Re-render the current photo, if any. With no photo this is a no-op
    /// and the canvas keeps its last-cleared state.
    pub fn composite(&mut self) -> RingframeResult<()> {
        let Some(photo) = &self.photo else {
            return Ok(());
        };
        self.compositor.composite(self.surface.as_mut(), photo)?;
        self.export_ready = true;
        Ok(())
    }

    /// Install the fixed overlay; fires the deferred overlay draw if a
    /// composite is waiting on it.
    pub fn install_overlay(&mut self, overlay: PreparedImage) -> RingframeResult<()> {
        self.compositor
            .install_overlay(self.surface.as_mut(), overlay)?;
        Ok(())
    }

    /// Whether the export affordance is available.
    pub fn can_export(&self) -> bool {
        self.export_ready
    }

    /// Export the current composite as PNG bytes.
    pub fn export_png(&self) -> RingframeResult<Vec<u8>> {
        self.ensure_exportable()?;
        encode_png(&self.surface.readback_rgba8()?)
    }

    /// Export the current composite as a `data:image/png;base64,` URL with
    /// identical pixel content.
    pub fn export_png_data_url(&self) -> RingframeResult<String> {
        self.ensure_exportable()?;
        encode_png_data_url(&self.surface.readback_rgba8()?)
    }

    /// Read back the current canvas.
    pub fn frame(&self) -> RingframeResult<FrameRgba> {
        self.surface.readback_rgba8()
    }

    fn ensure_exportable(&self) -> RingframeResult<()> {
        if !self.export_ready {
            return Err(RingframeError::validation(
                "nothing composited yet, export is unavailable",
            ));
        }
        Ok(())
    }
}

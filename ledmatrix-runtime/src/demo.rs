use std::time::Duration;

use ledmatrix::{
    graphics::{Align, Color, FontHandle, FontRegistry},
    host::{Cycle, FrameControl, Scene},
    layout::Address,
    render::{text::TextRenderer, FrameBuffer},
};

/// Panels the demo rotates through
pub const PANELS: usize = 3;

const PANEL_TIME: Duration = Duration::from_millis(1500);

pub struct Demo {
    fonts: FontRegistry,
    font: FontHandle,
    frame: u32,
}
impl Demo {
    pub fn new(fonts: FontRegistry, font: FontHandle) -> Self {
        Self {
            fonts,
            font,
            frame: 0,
        }
    }

    /// Title centered on a highlight box sized to the text
    fn title(&self, buffer: &mut FrameBuffer) -> eyre::Result<()> {
        let font = self.fonts.get(self.font)?;
        let anchor = Address::new(buffer.rows() / 2 + 2, buffer.cols() / 2);
        let text = TextRenderer::new(font)
            .align(Align::Center)
            .foreground(Color::WHITE);

        let extent = text.extent(anchor, "LED MATRIX")?;
        buffer.draw_box(
            Address::new(anchor.row - 7, extent.left - 2),
            Address::new(anchor.row + 2, extent.right() + 2),
            Color::from_hex("#1d3b8f"),
        );
        text.draw(buffer, anchor, "LED MATRIX")?;
        Ok(())
    }

    /// A row of diamonds cycling through the hues
    fn diamonds(&self, buffer: &mut FrameBuffer) {
        let row = buffer.rows() / 2;
        for (i, col) in (5..buffer.cols()).step_by(11).enumerate() {
            let hue = (self.frame * 40 + i as u32 * 50) % 360;
            buffer.draw_diamond(Address::new(row, col), 9, Color::from_hue(hue as f32));
        }
    }

    /// Frame counter, right-aligned inside a border
    fn counter(&self, buffer: &mut FrameBuffer) -> eyre::Result<()> {
        let (bottom, right) = (buffer.rows() - 1, buffer.cols() - 1);
        let border = Color::rgb(0, 160, 80);
        buffer.draw_line(Address::new(0, 0), Address::new(0, right), border);
        buffer.draw_line(Address::new(bottom, 0), Address::new(bottom, right), border);
        buffer.draw_line(Address::new(0, 0), Address::new(bottom, 0), border);
        buffer.draw_line(Address::new(0, right), Address::new(bottom, right), border);

        let font = self.fonts.get(self.font)?;
        let extent = TextRenderer::new(font)
            .align(Align::Right)
            .foreground(Color::YELLOW)
            .background(Color::rgb(40, 40, 40))
            .draw(buffer, Address::new(bottom - 3, right - 3), &format!("FRAME {}", self.frame))?;

        buffer.draw_dot(Address::new(bottom - 3, extent.left - 3), Color::RED);
        Ok(())
    }
}

impl Scene for Demo {
    fn draw(
        &mut self,
        buffer: &mut FrameBuffer,
        cycle: Option<Cycle>,
    ) -> eyre::Result<FrameControl> {
        let cycle = cycle.unwrap_or(Cycle::new(0, PANELS));
        match cycle.index {
            0 => self.title(buffer)?,
            1 => self.diamonds(buffer),
            _ => self.counter(buffer)?,
        }
        self.frame += 1;

        Ok(FrameControl {
            sleep: Some(PANEL_TIME),
            cycle: Some(cycle),
        })
    }
}

use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement, ImageBitmap, Window};

use crate::error::{describe, PetalError, Result};
use crate::surface::{Surface, SurfaceLayout};

/// Decoded petal image. The bitmap variant skips per-draw decoding.
pub enum Sprite {
    Image(HtmlImageElement),
    Bitmap(ImageBitmap),
}

/// Load and decode the sprite, then try to lift it into an `ImageBitmap`.
pub async fn load_sprite(window: &Window, src: &str) -> Result<Sprite> {
    let image = HtmlImageElement::new().map_err(|e| PetalError::Dom(describe(&e)))?;
    image.set_src(src);
    JsFuture::from(image.decode())
        .await
        .map_err(|e| PetalError::SpriteLoad {
            src: src.to_string(),
            reason: describe(&e),
        })?;

    match to_bitmap(window, &image).await {
        Ok(bitmap) => Ok(Sprite::Bitmap(bitmap)),
        Err(err) => {
            log::warn!("{err}; drawing from the image element");
            Ok(Sprite::Image(image))
        }
    }
}

async fn to_bitmap(window: &Window, image: &HtmlImageElement) -> Result<ImageBitmap> {
    let promise = window
        .create_image_bitmap_with_html_image_element(image)
        .map_err(|e| PetalError::Bitmap(describe(&e)))?;
    let value = JsFuture::from(promise)
        .await
        .map_err(|e| PetalError::Bitmap(describe(&e)))?;
    value
        .dyn_into::<ImageBitmap>()
        .map_err(|e| PetalError::Bitmap(describe(&e)))
}

/// The page-spanning petal canvas.
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    sprite: Option<Sprite>,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self> {
        let ctx = canvas
            .get_context("2d")
            .map_err(|e| PetalError::Dom(describe(&e)))?
            .ok_or(PetalError::NoContext)?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| PetalError::NoContext)?;
        Ok(Self {
            canvas,
            ctx,
            sprite: None,
        })
    }

    pub fn set_sprite(&mut self, sprite: Sprite) {
        self.sprite = Some(sprite);
    }
}

impl Surface for CanvasSurface {
    fn resize(&mut self, layout: &SurfaceLayout) {
        // Absolute positioning won't stretch past the viewport on its own.
        if let Err(e) = self
            .canvas
            .style()
            .set_property("height", &format!("{}px", layout.height))
        {
            log::warn!("canvas height not set: {}", describe(&e));
        }
        if self.canvas.width() != layout.backing_width {
            self.canvas.set_width(layout.backing_width);
        }
        if self.canvas.height() != layout.backing_height {
            self.canvas.set_height(layout.backing_height);
        }
        let s = layout.scale;
        if let Err(e) = self.ctx.set_transform(s, 0.0, 0.0, s, 0.0, 0.0) {
            log::warn!("canvas transform not set: {}", describe(&e));
        }
    }

    fn clear(&mut self, width: f64, height: f64) {
        self.ctx.clear_rect(0.0, 0.0, width, height);
    }

    fn save(&mut self) {
        self.ctx.save();
    }

    fn restore(&mut self) {
        self.ctx.restore();
    }

    fn translate(&mut self, x: f64, y: f64) {
        if let Err(e) = self.ctx.translate(x, y) {
            log::warn!("canvas translate failed: {}", describe(&e));
        }
    }

    fn rotate(&mut self, angle: f64) {
        if let Err(e) = self.ctx.rotate(angle) {
            log::warn!("canvas rotate failed: {}", describe(&e));
        }
    }

    fn set_alpha(&mut self, alpha: f64) {
        self.ctx.set_global_alpha(alpha);
    }

    fn draw_sprite(&mut self, x: f64, y: f64, width: f64, height: f64) {
        let drawn = match &self.sprite {
            Some(Sprite::Bitmap(bitmap)) => self
                .ctx
                .draw_image_with_image_bitmap_and_dw_and_dh(bitmap, x, y, width, height),
            Some(Sprite::Image(image)) => self
                .ctx
                .draw_image_with_html_image_element_and_dw_and_dh(image, x, y, width, height),
            None => Ok(()),
        };
        if let Err(e) = drawn {
            log::warn!("petal sprite not drawn: {}", describe(&e));
        }
    }
}

//! Watchpost egui adapter
//!
//! [`EguiSurface`] implements the overlay's presentation surface on egui
//! areas and painters; [`ProjectedScene`] keeps path geometry and paints it
//! through a [`Projector`]. A host owns an
//! `Overlay<EguiSurface, ProjectedScene>`, calls `Overlay::frame` once per
//! frame, then `EguiSurface::show` and `ProjectedScene::paint`.

mod projector;
mod scene;
mod surface;

pub use projector::Projector;
pub use scene::ProjectedScene;
pub use surface::EguiSurface;

use watchpost_core::Color3;

/// Overlay colour plus alpha as an egui colour
pub fn to_color32(color: Color3, alpha: f32) -> egui::Color32 {
    let [r, g, b] = color.to_rgb8();
    let a = (alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
    egui::Color32::from_rgba_unmultiplied(r, g, b, a)
}

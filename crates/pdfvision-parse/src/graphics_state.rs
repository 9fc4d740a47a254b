//! Graphics state stack for the content stream interpreter.
//!
//! Tracks the CTM and the fill and stroke paints with their color spaces,
//! saved by `q` and restored by `Q`.

use pdfvision_core::{Color, Ctm};

use crate::color_space::{MAX_COMPONENTS, ResolvedColorSpace, color_space_for_components};

#[derive(Debug, Clone, PartialEq)]
struct Paint {
    color: Color,
    /// Space selected by `cs`/`CS`; `None` after `g`/`rg`/`k`, in which case
    /// `sc`/`scn` infer the space from the component count.
    space: Option<ResolvedColorSpace>,
}

impl Paint {
    fn black() -> Self {
        Self {
            color: Color::black(),
            space: None,
        }
    }

    fn set_device(&mut self, color: Color) {
        self.color = color;
        self.space = None;
    }

    fn set_space(&mut self, space: ResolvedColorSpace) {
        self.color = space.initial_color();
        self.space = Some(space);
    }

    /// Operands past [`MAX_COMPONENTS`] are ignored.
    fn set_components(&mut self, components: &[f32]) {
        let components = &components[..components.len().min(MAX_COMPONENTS)];
        self.color = match self.space.as_ref() {
            Some(space) => space.to_color(components),
            None => match color_space_for_components(components.len()) {
                Some(space) => space.to_color(components),
                None => Color::Other {
                    space: format!("{}-component", components.len()),
                    components: components.to_vec(),
                    rgb: None,
                },
            },
        };
    }
}

#[derive(Debug, Clone, PartialEq)]
struct State {
    ctm: Ctm,
    fill: Paint,
    stroke: Paint,
}

/// Graphics state with its `q`/`Q` stack.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphicsState {
    current: State,
    stack: Vec<State>,
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphicsState {
    /// Identity CTM, black fill and stroke.
    pub fn new() -> Self {
        Self::with_ctm(Ctm::identity())
    }

    pub fn with_ctm(ctm: Ctm) -> Self {
        Self {
            current: State {
                ctm,
                fill: Paint::black(),
                stroke: Paint::black(),
            },
            stack: Vec::new(),
        }
    }

    pub fn ctm(&self) -> &Ctm {
        &self.current.ctm
    }

    pub fn fill_color(&self) -> &Color {
        &self.current.fill.color
    }

    pub fn stroke_color(&self) -> &Color {
        &self.current.stroke.color
    }

    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    /// `q`
    pub fn save_state(&mut self) {
        self.stack.push(self.current.clone());
    }

    /// `Q`. Returns `false` on an unbalanced restore, leaving the state as is.
    pub fn restore_state(&mut self) -> bool {
        match self.stack.pop() {
            Some(saved) => {
                self.current = saved;
                true
            }
            None => false,
        }
    }

    /// `cm`: `CTM' = m x CTM`.
    pub fn concat_matrix(&mut self, m: &Ctm) {
        self.current.ctm = m.concat(&self.current.ctm);
    }

    /// `g`
    pub fn set_fill_gray(&mut self, gray: f32) {
        self.current.fill.set_device(Color::Gray(gray));
    }

    /// `G`
    pub fn set_stroke_gray(&mut self, gray: f32) {
        self.current.stroke.set_device(Color::Gray(gray));
    }

    /// `rg`
    pub fn set_fill_rgb(&mut self, r: f32, g: f32, b: f32) {
        self.current.fill.set_device(Color::Rgb(r, g, b));
    }

    /// `RG`
    pub fn set_stroke_rgb(&mut self, r: f32, g: f32, b: f32) {
        self.current.stroke.set_device(Color::Rgb(r, g, b));
    }

    /// `k`
    pub fn set_fill_cmyk(&mut self, c: f32, m: f32, y: f32, k: f32) {
        self.current.fill.set_device(Color::Cmyk(c, m, y, k));
    }

    /// `K`
    pub fn set_stroke_cmyk(&mut self, c: f32, m: f32, y: f32, k: f32) {
        self.current.stroke.set_device(Color::Cmyk(c, m, y, k));
    }

    /// `cs`: select the fill space and reset the fill to its initial color.
    pub fn set_fill_color_space(&mut self, space: ResolvedColorSpace) {
        self.current.fill.set_space(space);
    }

    /// `CS`
    pub fn set_stroke_color_space(&mut self, space: ResolvedColorSpace) {
        self.current.stroke.set_space(space);
    }

    /// `sc`/`scn`
    pub fn set_fill_components(&mut self, components: &[f32]) {
        self.current.fill.set_components(components);
    }

    /// `SC`/`SCN`
    pub fn set_stroke_components(&mut self, components: &[f32]) {
        self.current.stroke.set_components(components);
    }
}

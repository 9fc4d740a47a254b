//! Color space resolution for the color operators.
//!
//! Device spaces produce [`Color::Gray`], [`Color::Rgb`] and [`Color::Cmyk`]
//! directly. Every other space produces [`Color::Other`] with an RGB
//! conversion computed through its alternate or base space, or `None`
//! when the space cannot be converted (Pattern, Lab, unknown names, tint
//! transforms that are not evaluated).

use lopdf::{Dictionary, Document, Object};
use pdfvision_core::Color;

use crate::lopdf_backend::{object_to_f64, resolve_ref};

/// Most components a color may carry; the DeviceN colorant limit.
pub const MAX_COMPONENTS: usize = 32;

/// Tint transform function of a Separation or DeviceN space.
#[derive(Debug, Clone, PartialEq)]
pub enum TintTransform {
    /// FunctionType 2: `C0 + x^N * (C1 - C0)` for one input clamped to
    /// `domain`.
    Exponential {
        domain: [f32; 2],
        c0: Vec<f32>,
        c1: Vec<f32>,
        exponent: f32,
    },
    /// A function that is not evaluated (sampled, stitching, PostScript, or
    /// malformed).
    Unsupported { function_type: Option<i64> },
}

impl TintTransform {
    /// Read a function dictionary or stream.
    pub fn from_object(obj: &Object, doc: &Document) -> Self {
        let dict = match resolve_ref(doc, obj) {
            Object::Dictionary(d) => d,
            Object::Stream(s) => &s.dict,
            _ => return TintTransform::Unsupported { function_type: None },
        };
        let function_type = dict.get(b"FunctionType").ok().and_then(|o| o.as_i64().ok());
        if function_type != Some(2) {
            return TintTransform::Unsupported { function_type };
        }
        Self::exponential(dict, doc).unwrap_or(TintTransform::Unsupported { function_type })
    }

    fn exponential(dict: &Dictionary, doc: &Document) -> Option<Self> {
        let c0 = number_array(dict, doc, b"C0").unwrap_or_else(|| vec![0.0]);
        let c1 = number_array(dict, doc, b"C1").unwrap_or_else(|| vec![1.0]);
        if c0.len() != c1.len() || c0.is_empty() || c0.len() > MAX_COMPONENTS {
            return None;
        }
        let domain = match number_array(dict, doc, b"Domain").as_deref() {
            Some([lo, hi, ..]) => [*lo, *hi],
            _ => [0.0, 1.0],
        };
        let exponent = dict
            .get(b"N")
            .ok()
            .and_then(|o| object_to_f64(resolve_ref(doc, o)).ok())
            .map_or(1.0, |n| n as f32);
        Some(TintTransform::Exponential {
            domain,
            c0,
            c1,
            exponent,
        })
    }

    /// Outputs for `inputs`, or `None` when the function cannot be evaluated
    /// for them.
    pub fn evaluate(&self, inputs: &[f32]) -> Option<Vec<f32>> {
        match self {
            TintTransform::Exponential {
                domain,
                c0,
                c1,
                exponent,
            } => {
                let [x] = inputs else {
                    return None;
                };
                let x = x.max(domain[0]).min(domain[1]);
                let t = x.powf(*exponent);
                let out: Vec<f32> = c0.iter().zip(c1).map(|(a, b)| a + t * (b - a)).collect();
                out.iter().all(|v| v.is_finite()).then_some(out)
            }
            TintTransform::Unsupported { .. } => None,
        }
    }

    /// Why this function cannot serve a space with `inputs` components.
    fn problem(&self, inputs: u32) -> Option<String> {
        match self {
            TintTransform::Exponential { .. } if inputs != 1 => Some(format!(
                "FunctionType 2 tint transform takes 1 input, the space has {inputs}"
            )),
            TintTransform::Exponential { .. } => None,
            TintTransform::Unsupported {
                function_type: Some(t),
            } => Some(format!("FunctionType {t} tint transform is not evaluated")),
            TintTransform::Unsupported { function_type: None } => {
                Some("tint transform is not a function".to_string())
            }
        }
    }
}

/// A color space as selected by `cs`/`CS`.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedColorSpace {
    DeviceGray,
    DeviceRGB,
    DeviceCMYK,
    /// ICC profile; converted through `/Alternate`, or the device space
    /// matching `/N`.
    ICCBased {
        num_components: u32,
        alternate: Box<ResolvedColorSpace>,
    },
    /// Palette lookup into `base`.
    Indexed {
        base: Box<ResolvedColorSpace>,
        hival: u32,
        /// `(hival + 1) * base components` bytes.
        lookup_table: Vec<u8>,
    },
    /// Spot color; the tint goes through `tint_transform` into `alternate`.
    Separation {
        alternate: Box<ResolvedColorSpace>,
        tint_transform: TintTransform,
    },
    DeviceN {
        num_components: u32,
        alternate: Box<ResolvedColorSpace>,
        tint_transform: TintTransform,
    },
    /// A space with no RGB conversion.
    Unsupported { name: String },
}

impl ResolvedColorSpace {
    /// Family name as written in the PDF.
    pub fn family(&self) -> &str {
        match self {
            ResolvedColorSpace::DeviceGray => "DeviceGray",
            ResolvedColorSpace::DeviceRGB => "DeviceRGB",
            ResolvedColorSpace::DeviceCMYK => "DeviceCMYK",
            ResolvedColorSpace::ICCBased { .. } => "ICCBased",
            ResolvedColorSpace::Indexed { .. } => "Indexed",
            ResolvedColorSpace::Separation { .. } => "Separation",
            ResolvedColorSpace::DeviceN { .. } => "DeviceN",
            ResolvedColorSpace::Unsupported { name } => name,
        }
    }

    pub fn num_components(&self) -> u32 {
        match self {
            ResolvedColorSpace::DeviceGray => 1,
            ResolvedColorSpace::DeviceRGB => 3,
            ResolvedColorSpace::DeviceCMYK => 4,
            ResolvedColorSpace::ICCBased { num_components, .. } => *num_components,
            ResolvedColorSpace::Indexed { .. } => 1,
            ResolvedColorSpace::Separation { .. } => 1,
            ResolvedColorSpace::DeviceN { num_components, .. } => *num_components,
            ResolvedColorSpace::Unsupported { .. } => 1,
        }
    }

    /// Why colors in this space have no RGB conversion, for spaces that
    /// resolved but carry a tint transform that is not evaluated.
    pub fn tint_transform_problem(&self) -> Option<String> {
        match self {
            ResolvedColorSpace::Separation { tint_transform, .. } => tint_transform.problem(1),
            ResolvedColorSpace::DeviceN {
                num_components,
                tint_transform,
                ..
            } => tint_transform.problem(*num_components),
            ResolvedColorSpace::Indexed { base, .. } => base.tint_transform_problem(),
            _ => None,
        }
    }

    /// The color a `cs`/`CS` selection starts with: black for device spaces,
    /// index 0 for Indexed, full tint for Separation and DeviceN, and
    /// all-zero components otherwise.
    pub fn initial_color(&self) -> Color {
        let n = self.num_components() as usize;
        match self {
            ResolvedColorSpace::DeviceCMYK => Color::Cmyk(0.0, 0.0, 0.0, 1.0),
            ResolvedColorSpace::Separation { .. } | ResolvedColorSpace::DeviceN { .. } => {
                self.to_color(&vec![1.0; n])
            }
            _ => self.to_color(&vec![0.0; n]),
        }
    }

    /// Convert operand components to a [`Color`]. Missing components read
    /// as `0.0`.
    pub fn to_color(&self, components: &[f32]) -> Color {
        let c = |i: usize| components.get(i).copied().unwrap_or(0.0);
        match self {
            ResolvedColorSpace::DeviceGray => Color::Gray(c(0)),
            ResolvedColorSpace::DeviceRGB => Color::Rgb(c(0), c(1), c(2)),
            ResolvedColorSpace::DeviceCMYK => Color::Cmyk(c(0), c(1), c(2), c(3)),
            _ => Color::Other {
                space: self.family().to_string(),
                components: components.to_vec(),
                rgb: self.to_rgb(components),
            },
        }
    }

    /// Generic RGB conversion used for non-device spaces.
    fn to_rgb(&self, components: &[f32]) -> Option<[f32; 3]> {
        match self {
            ResolvedColorSpace::DeviceGray
            | ResolvedColorSpace::DeviceRGB
            | ResolvedColorSpace::DeviceCMYK => self.to_color(components).to_rgb(),
            ResolvedColorSpace::ICCBased { alternate, .. } => alternate.to_rgb(components),
            ResolvedColorSpace::Indexed {
                base,
                hival,
                lookup_table,
            } => {
                let index = (components.first().copied().unwrap_or(0.0).max(0.0) as u32).min(*hival);
                let n = base.num_components() as usize;
                let offset = index as usize * n;
                let entry = lookup_table.get(offset..offset + n)?;
                let base_components: Vec<f32> = entry.iter().map(|&b| f32::from(b) / 255.0).collect();
                base.to_rgb(&base_components)
            }
            ResolvedColorSpace::Separation {
                alternate,
                tint_transform,
            } => {
                let tint = components.first().copied().unwrap_or(0.0);
                alternate.to_rgb(&tint_transform.evaluate(&[tint])?)
            }
            ResolvedColorSpace::DeviceN {
                num_components,
                alternate,
                tint_transform,
            } => {
                let n = *num_components as usize;
                let inputs: Vec<f32> = (0..n)
                    .map(|i| components.get(i).copied().unwrap_or(0.0))
                    .collect();
                alternate.to_rgb(&tint_transform.evaluate(&inputs)?)
            }
            ResolvedColorSpace::Unsupported { .. } => None,
        }
    }
}

/// A numeric array entry; `None` when absent or not all numbers.
fn number_array(dict: &Dictionary, doc: &Document, key: &[u8]) -> Option<Vec<f32>> {
    resolve_ref(doc, dict.get(key).ok()?)
        .as_array()
        .ok()?
        .iter()
        .map(|v| object_to_f64(resolve_ref(doc, v)).ok().map(|v| v as f32))
        .collect()
}

/// Device space implied by a component count, for `sc`/`scn` without a
/// preceding `cs`.
pub fn color_space_for_components(n: usize) -> Option<ResolvedColorSpace> {
    match n {
        1 => Some(ResolvedColorSpace::DeviceGray),
        3 => Some(ResolvedColorSpace::DeviceRGB),
        4 => Some(ResolvedColorSpace::DeviceCMYK),
        _ => None,
    }
}

fn device_space(name: &str) -> Option<ResolvedColorSpace> {
    match name {
        "DeviceGray" | "G" | "CalGray" => Some(ResolvedColorSpace::DeviceGray),
        "DeviceRGB" | "RGB" | "CalRGB" => Some(ResolvedColorSpace::DeviceRGB),
        "DeviceCMYK" | "CMYK" => Some(ResolvedColorSpace::DeviceCMYK),
        _ => None,
    }
}

/// Resolve the operand of `cs`/`CS`: a device family name, or a key of the
/// `/ColorSpace` resource dictionary.
pub fn resolve_color_space_name(
    name: &str,
    doc: &Document,
    resources: &lopdf::Dictionary,
) -> ResolvedColorSpace {
    if let Some(cs) = device_space(name) {
        return cs;
    }
    let entry = resources
        .get(b"ColorSpace")
        .ok()
        .and_then(|o| resolve_ref(doc, o).as_dict().ok())
        .and_then(|d| d.get(name.as_bytes()).ok());
    match entry {
        Some(obj) => resolve_color_space_object(obj, doc),
        None => ResolvedColorSpace::Unsupported {
            name: name.to_string(),
        },
    }
}

/// Resolve a color space object: a name or a `[/Family ...]` array.
pub fn resolve_color_space_object(obj: &Object, doc: &Document) -> ResolvedColorSpace {
    match resolve_ref(doc, obj) {
        Object::Name(name) => {
            let name = String::from_utf8_lossy(name);
            device_space(&name).unwrap_or(ResolvedColorSpace::Unsupported {
                name: name.into_owned(),
            })
        }
        Object::Array(arr) => resolve_color_space_array(arr, doc),
        _ => ResolvedColorSpace::Unsupported {
            name: "non-name object".to_string(),
        },
    }
}

fn resolve_color_space_array(arr: &[Object], doc: &Document) -> ResolvedColorSpace {
    let family = match arr.first().map(|o| resolve_ref(doc, o)) {
        Some(Object::Name(n)) => String::from_utf8_lossy(n).into_owned(),
        _ => {
            return ResolvedColorSpace::Unsupported {
                name: "array".to_string(),
            };
        }
    };
    let resolved = match family.as_str() {
        "ICCBased" => resolve_icc_based(arr, doc),
        "Indexed" | "I" => resolve_indexed(arr, doc),
        "Separation" => resolve_separation(arr, doc),
        "DeviceN" => resolve_device_n(arr, doc),
        other => device_space(other),
    };
    resolved.unwrap_or(ResolvedColorSpace::Unsupported { name: family })
}

/// `[/ICCBased stream]`
fn resolve_icc_based(arr: &[Object], doc: &Document) -> Option<ResolvedColorSpace> {
    let stream = resolve_ref(doc, arr.get(1)?).as_stream().ok()?;
    // ICC profiles have 1, 3 or 4 components
    let num_components = match stream.dict.get(b"N").ok().map(|o| resolve_ref(doc, o).as_i64()) {
        None => 3,
        Some(Ok(n @ (1 | 3 | 4))) => n as u32,
        Some(_) => return None,
    };
    let alternate = stream
        .dict
        .get(b"Alternate")
        .ok()
        .map(|o| resolve_color_space_object(o, doc))
        .filter(|cs| !matches!(cs, ResolvedColorSpace::Unsupported { .. }))
        .or_else(|| color_space_for_components(num_components as usize))
        .unwrap_or(ResolvedColorSpace::DeviceRGB);
    Some(ResolvedColorSpace::ICCBased {
        num_components,
        alternate: Box::new(alternate),
    })
}

/// `[/Indexed base hival lookup]`
fn resolve_indexed(arr: &[Object], doc: &Document) -> Option<ResolvedColorSpace> {
    let base = resolve_color_space_object(arr.get(1)?, doc);
    let hival = resolve_ref(doc, arr.get(2)?).as_i64().ok()?.max(0) as u32;
    let lookup_table = match resolve_ref(doc, arr.get(3)?) {
        Object::String(bytes, _) => bytes.clone(),
        Object::Stream(s) => s
            .decompressed_content()
            .unwrap_or_else(|_| s.content.clone()),
        _ => return None,
    };
    Some(ResolvedColorSpace::Indexed {
        base: Box::new(base),
        hival,
        lookup_table,
    })
}

/// `[/Separation name alternate tintTransform]`
fn resolve_separation(arr: &[Object], doc: &Document) -> Option<ResolvedColorSpace> {
    let alternate = resolve_color_space_object(arr.get(2)?, doc);
    let tint_transform = TintTransform::from_object(arr.get(3)?, doc);
    Some(ResolvedColorSpace::Separation {
        alternate: Box::new(alternate),
        tint_transform,
    })
}

/// `[/DeviceN names alternate tintTransform]`
fn resolve_device_n(arr: &[Object], doc: &Document) -> Option<ResolvedColorSpace> {
    let names = resolve_ref(doc, arr.get(1)?).as_array().ok()?.len();
    if names == 0 || names > MAX_COMPONENTS {
        return None;
    }
    let alternate = resolve_color_space_object(arr.get(2)?, doc);
    let tint_transform = TintTransform::from_object(arr.get(3)?, doc);
    Some(ResolvedColorSpace::DeviceN {
        num_components: names as u32,
        alternate: Box::new(alternate),
        tint_transform,
    })
}

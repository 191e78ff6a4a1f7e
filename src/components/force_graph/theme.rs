//! Visual theming for the force graph.
//!
//! Provides colors, palettes and the per-element style the renderer falls
//! back to when the reduced attributes carry no explicit color.

/// RGBA color representation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
	/// Red.
	pub r: u8,
	/// Green.
	pub g: u8,
	/// Blue.
	pub b: u8,
	/// Alpha in `0.0..=1.0`.
	pub a: f64,
}

impl Color {
	/// Opaque color.
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	/// Color with alpha.
	pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
		Self { r, g, b, a }
	}

	/// Lighten the color by a factor (0.0 = unchanged, 1.0 = white)
	pub fn lighten(self, factor: f64) -> Self {
		let f = factor.clamp(0.0, 1.0);
		Self {
			r: (self.r as f64 + (255.0 - self.r as f64) * f) as u8,
			g: (self.g as f64 + (255.0 - self.g as f64) * f) as u8,
			b: (self.b as f64 + (255.0 - self.b as f64) * f) as u8,
			a: self.a,
		}
	}

	/// Darken the color by a factor (0.0 = unchanged, 1.0 = black)
	pub fn darken(self, factor: f64) -> Self {
		let f = 1.0 - factor.clamp(0.0, 1.0);
		Self {
			r: (self.r as f64 * f) as u8,
			g: (self.g as f64 * f) as u8,
			b: (self.b as f64 * f) as u8,
			a: self.a,
		}
	}

	/// CSS `rgba(...)` string.
	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
		}
	}

	/// Parses a CSS color string.
	/// Supports hex (`#RRGGBB`, `#RGB`) and `rgb()`/`rgba()` functional notation;
	/// anything else becomes mid gray.
	pub fn parse(color_str: &str) -> Color {
		let s = color_str.trim();
		if let Some(hex) = s.strip_prefix('#') {
			let channel = |range: std::ops::Range<usize>, short: bool| {
				hex.get(range)
					.and_then(|c| u8::from_str_radix(c, 16).ok())
					.map(|v| if short { v * 17 } else { v })
					.unwrap_or(128)
			};
			match hex.len() {
				6 => Color::rgb(channel(0..2, false), channel(2..4, false), channel(4..6, false)),
				3 => Color::rgb(channel(0..1, true), channel(1..2, true), channel(2..3, true)),
				_ => Color::rgb(128, 128, 128),
			}
		} else if s.starts_with("rgb") {
			let nums: Vec<&str> = s
				.trim_start_matches("rgba(")
				.trim_start_matches("rgb(")
				.trim_end_matches(')')
				.split(',')
				.collect();
			let channel = |i: usize| {
				nums.get(i)
					.and_then(|s| s.trim().parse().ok())
					.unwrap_or(128)
			};
			let a = nums
				.get(3)
				.and_then(|s| s.trim().parse().ok())
				.unwrap_or(1.0);
			Color::rgba(channel(0), channel(1), channel(2), a)
		} else {
			Color::rgb(128, 128, 128)
		}
	}
}

/// A curated color palette for nodes.
#[derive(Clone, Debug)]
pub struct NodePalette {
	/// Colors cycled by draw slot.
	pub colors: Vec<Color>,
}

impl NodePalette {
	/// Muted, harmonious palette - slate blues and teals
	pub fn slate() -> Self {
		Self {
			colors: vec![
				Color::rgb(94, 129, 172),  // Steel blue
				Color::rgb(129, 161, 193), // Light steel
				Color::rgb(100, 148, 160), // Teal gray
				Color::rgb(136, 160, 175), // Cadet blue
				Color::rgb(108, 142, 173), // Air force blue
				Color::rgb(119, 158, 165), // Desaturated cyan
				Color::rgb(143, 163, 180), // Cool gray
				Color::rgb(122, 153, 168), // Dusty blue
			],
		}
	}

	/// Stronger tones that stay readable on a light background
	pub fn vivid() -> Self {
		Self {
			colors: vec![
				Color::rgb(31, 119, 180),
				Color::rgb(255, 127, 14),
				Color::rgb(44, 160, 44),
				Color::rgb(214, 39, 40),
				Color::rgb(148, 103, 189),
				Color::rgb(140, 86, 75),
				Color::rgb(227, 119, 194),
				Color::rgb(23, 190, 207),
			],
		}
	}

	/// Color for `index`, wrapping around.
	pub fn get(&self, index: usize) -> Color {
		self.colors[index % self.colors.len()]
	}
}

/// Background style configuration.
#[derive(Clone, Debug)]
pub struct BackgroundStyle {
	/// Primary background color
	pub color: Color,
	/// Secondary color for gradients
	pub color_secondary: Color,
	/// Whether to use radial gradient
	pub use_gradient: bool,
}

/// Edge visual style.
#[derive(Clone, Debug)]
pub struct EdgeStyle {
	/// Color for edges without one of their own
	pub color: Color,
	/// Edge label text color.
	pub label_color: Color,
}

/// Node visual style.
#[derive(Clone, Debug)]
pub struct NodeStyle {
	/// Whether nodes have inner gradients
	pub use_gradient: bool,
	/// Border/stroke width in screen pixels (0 = no border)
	pub border_width: f64,
	/// Border stroke color.
	pub border_color: Color,
	/// Ring drawn around highlighted nodes
	pub ring_color: Color,
	/// Node label text color.
	pub label_color: Color,
}

/// Complete visual theme.
#[derive(Clone, Debug)]
pub struct Theme {
	/// Display name.
	pub name: &'static str,
	/// Canvas background.
	pub background: BackgroundStyle,
	/// Edge style.
	pub edge: EdgeStyle,
	/// Node style.
	pub node: NodeStyle,
	/// Fallback node colors.
	pub palette: NodePalette,
}

impl Theme {
	/// Light theme; dimmed nodes fade into the page (default)
	pub fn light() -> Self {
		Self {
			name: "light",
			background: BackgroundStyle {
				color: Color::rgb(255, 255, 255),
				color_secondary: Color::rgb(240, 245, 255),
				use_gradient: true,
			},
			edge: EdgeStyle {
				color: Color::rgba(160, 170, 185, 0.8),
				label_color: Color::rgb(90, 100, 115),
			},
			node: NodeStyle {
				use_gradient: false,
				border_width: 0.0,
				border_color: Color::rgba(255, 255, 255, 0.0),
				ring_color: Color::rgb(33, 33, 33),
				label_color: Color::rgb(33, 33, 33),
			},
			palette: NodePalette::vivid(),
		}
	}

	/// Dark theme with gradient-shaded nodes
	pub fn midnight() -> Self {
		Self {
			name: "midnight",
			background: BackgroundStyle {
				color: Color::rgb(18, 20, 28),
				color_secondary: Color::rgb(25, 28, 38),
				use_gradient: true,
			},
			edge: EdgeStyle {
				color: Color::rgba(100, 120, 150, 0.45),
				label_color: Color::rgba(220, 225, 235, 0.8),
			},
			node: NodeStyle {
				use_gradient: true,
				border_width: 1.0,
				border_color: Color::rgba(255, 255, 255, 0.3),
				ring_color: Color::rgba(255, 255, 255, 0.8),
				label_color: Color::rgba(255, 255, 255, 0.85),
			},
			palette: NodePalette::slate(),
		}
	}
}

impl Default for Theme {
	fn default() -> Self {
		Self::light()
	}
}

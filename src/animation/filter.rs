use crate::foundation::core::Rgba8Premul;

macro_rules! name_table {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident { $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        $vis enum $name {
            /// Sentinel for names missing from the table.
            Invalid,
            $( $(#[$vmeta])* $variant, )+
        }

        impl $name {
            const TABLE: &'static [(&'static str, $name)] = &[ $( ($text, $name::$variant), )+ ];

            /// Look a name up, ignoring ASCII case. Unknown names map to `Invalid`.
            pub fn from_name(name: &str) -> Self {
                let name = name.trim();
                Self::TABLE
                    .iter()
                    .find(|(text, _)| text.eq_ignore_ascii_case(name))
                    .map(|&(_, v)| v)
                    .unwrap_or(Self::Invalid)
            }

            /// Canonical document name (`"Invalid"` for the sentinel).
            pub fn name(self) -> &'static str {
                Self::TABLE
                    .iter()
                    .find(|&&(_, v)| v == self)
                    .map(|&(text, _)| text)
                    .unwrap_or("Invalid")
            }

            /// Every named variant, in table order.
            pub fn all() -> impl Iterator<Item = Self> {
                Self::TABLE.iter().map(|&(_, v)| v)
            }

            /// Return `true` for anything but the sentinel.
            pub fn is_valid(self) -> bool {
                self != Self::Invalid
            }
        }
    };
}

name_table! {
    /// Transition family as named by slide and animation metadata.
    pub enum TransitionType {
        /// Explicitly no transition.
        None => "None",
        /// Straight bar sweeping across the slide.
        BarWipe => "BarWipe",
        /// Rotating blades ("wheel").
        PinWheelWipe => "PinWheelWipe",
        /// Cover / uncover.
        SlideWipe => "SlideWipe",
        /// Random bars.
        RandomBarWipe => "RandomBarWipe",
        /// Checkerboard.
        CheckerBoardWipe => "CheckerBoardWipe",
        /// Four boxes ("plus").
        FourBoxWipe => "FourBoxWipe",
        /// Rectangular or diamond iris.
        IrisWipe => "IrisWipe",
        /// Fan ("wedge").
        FanWipe => "FanWipe",
        /// Venetian blinds.
        BlindsWipe => "BlindsWipe",
        /// Fades, optionally through a colour.
        Fade => "Fade",
        /// Random cell dissolve.
        Dissolve => "Dissolve",
        /// Barn door ("split").
        BarnDoorWipe => "BarnDoorWipe",
        /// Diagonal staircase ("diagonal").
        WaterfallWipe => "WaterfallWipe",
        /// Assorted shapes and 3-D scenes.
        MiscShapeWipe => "MiscShapeWipe",
        /// Zoom family ("news flash").
        Zoom => "Zoom",
        /// Circle and ellipse iris.
        EllipseWipe => "EllipseWipe",
        /// Push.
        PushWipe => "PushWipe",
    }
}

name_table! {
    /// Transition variant within a [`TransitionType`].
    pub enum TransitionSubType {
        /// Default variant.
        Default => "Default",
        /// Sweep from left to right.
        LeftToRight => "LeftToRight",
        /// Sweep from top to bottom.
        TopToBottom => "TopToBottom",
        /// One blade.
        OneBlade => "OneBlade",
        /// Two vertical blades.
        TwoBladeVertical => "TwoBladeVertical",
        /// Two horizontal blades.
        TwoBladeHorizontal => "TwoBladeHorizontal",
        /// Three blades.
        ThreeBlade => "ThreeBlade",
        /// Four blades.
        FourBlade => "FourBlade",
        /// Eight blades.
        EightBlade => "EightBlade",
        /// Vertical orientation.
        Vertical => "Vertical",
        /// Horizontal orientation.
        Horizontal => "Horizontal",
        /// Downward.
        Down => "Down",
        /// Across.
        Across => "Across",
        /// Corners inwards.
        CornersIn => "CornersIn",
        /// Corners outwards.
        CornersOut => "CornersOut",
        /// Rectangle.
        Rectangle => "Rectangle",
        /// Diamond.
        Diamond => "Diamond",
        /// Circle.
        Circle => "Circle",
        /// Anchored at the top centre.
        CenterTop => "CenterTop",
        /// Vertical, starting left.
        VerticalLeft => "VerticalLeft",
        /// Vertical, starting right.
        VerticalRight => "VerticalRight",
        /// Horizontal, starting left.
        HorizontalLeft => "HorizontalLeft",
        /// Horizontal, starting right.
        HorizontalRight => "HorizontalRight",
        /// Plain crossfade.
        CrossFade => "CrossFade",
        /// Fade to a colour, then to the entering slide.
        FadeToColor => "FadeToColor",
        /// Fade from a colour.
        FadeFromColor => "FadeFromColor",
        /// Fade over a colour.
        FadeOverColor => "FadeOverColor",
        /// Enter from the left edge.
        FromLeft => "FromLeft",
        /// Enter from the top edge.
        FromTop => "FromTop",
        /// Enter from the right edge.
        FromRight => "FromRight",
        /// Enter from the bottom edge.
        FromBottom => "FromBottom",
        /// Enter from the top-left corner.
        FromTopLeft => "FromTopLeft",
        /// Enter from the top-right corner.
        FromTopRight => "FromTopRight",
        /// Enter from the bottom-left corner.
        FromBottomLeft => "FromBottomLeft",
        /// Enter from the bottom-right corner.
        FromBottomRight => "FromBottomRight",
        /// Heart shape.
        Heart => "Heart",
        /// Rotate in while zooming.
        RotateIn => "RotateIn",
    }
}

/// Declared effect parameters, immutable once built.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransitionFilterInfo {
    /// Effect family.
    pub transition_type: TransitionType,
    /// Effect variant.
    pub subtype: TransitionSubType,
    /// `false` requests the effect's reverse direction.
    pub is_direction_forward: bool,
    /// `false` marks an exit ("out") effect.
    pub is_mode_in: bool,
    /// Colour used by fade-through-colour effects.
    pub fade_color: Option<Rgba8Premul>,
}

impl TransitionFilterInfo {
    /// Forward, entering variant of an effect without fade colour.
    pub fn new(transition_type: TransitionType, subtype: TransitionSubType) -> Self {
        Self {
            transition_type,
            subtype,
            is_direction_forward: true,
            is_mode_in: true,
            fade_color: None,
        }
    }

    /// Build from metadata strings. Unknown names become `Invalid`; a malformed colour is dropped.
    pub fn from_names(
        transition_type: &str,
        subtype: &str,
        is_direction_forward: bool,
        is_mode_in: bool,
        fade_color: Option<&str>,
    ) -> Self {
        let fade_color = fade_color.and_then(|s| match Rgba8Premul::from_hex(s) {
            Ok(c) => Some(c),
            Err(err) => {
                tracing::warn!(%err, "ignoring fade colour");
                None
            }
        });
        Self {
            transition_type: TransitionType::from_name(transition_type),
            subtype: TransitionSubType::from_name(subtype),
            is_direction_forward,
            is_mode_in,
            fade_color,
        }
    }

    /// Same effect with a different direction flag.
    pub fn with_direction(mut self, forward: bool) -> Self {
        self.is_direction_forward = forward;
        self
    }

    /// Same effect with a different mode flag.
    pub fn with_mode_in(mut self, mode_in: bool) -> Self {
        self.is_mode_in = mode_in;
        self
    }

    /// Fade colour, defaulting to opaque black.
    pub fn fade_color_or_black(&self) -> Rgba8Premul {
        self.fade_color.unwrap_or_else(Rgba8Premul::black)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/filter.rs"]
mod tests;

//! Instructions sent alongside the user's media for each AI tool.

use std::fmt;
use std::str::FromStr;

use crate::{ChoiceParseError, GenAiError, Result};

pub const ENHANCE: &str = "Améliore la qualité de cette image. Augmente la clarté, réduit le bruit, et corrige les couleurs et l'éclairage sans changer le contenu ou la résolution.";

pub const REMOVE_BACKGROUND: &str = "Crucial : Supprime l'arrière-plan de cette image. L'image de sortie doit avoir un arrière-plan transparent. Le sujet doit être parfaitement et proprement isolé. Le format de sortie doit être un PNG pour préserver la transparence.";

pub const REMOVE_LOGO: &str = "Remove any logos or watermarks from this image. Fill in the area where the logo or watermark was located so that it blends realistically and seamlessly with the surrounding background.";

pub const OCR: &str = "Extrais tout le texte de cette image.";

pub fn upscale(width: u32, height: u32, target_width: u32, target_height: u32) -> String {
    format!(
        "Crucial : Agrandis cette image. Les dimensions de l'image originale sont de {width}x{height} pixels. \
         Les dimensions de sortie requises sont exactement de {target_width}x{target_height} pixels. \
         Ne modifie pas le rapport d'aspect. Préserve tous les détails et le style artistique d'origine. \
         N'ajoute, ne supprime et ne modifie aucun élément de l'image. \
         L'image de sortie doit avoir les dimensions exactes de {target_width}x{target_height}."
    )
}

pub fn resize(width: u32, height: u32, target_width: u32, target_height: u32) -> String {
    format!(
        "Extrêmement important : redimensionnez cette image. Les dimensions originales sont {width}x{height} pixels. \
         Les dimensions de sortie requises sont exactement {target_width}x{target_height} pixels. \
         Préservez tous les détails et le style artistique d'origine. \
         N'ajoutez, ne supprimez ou ne modifiez aucun élément de l'image. \
         L'image de sortie doit avoir les dimensions exactes de {target_width}x{target_height}. Ne rognez pas l'image."
    )
}

/// Fails on a blank description.
pub fn remove_object(description: &str) -> Result<String> {
    let description = description.trim();
    if description.is_empty() {
        return Err(GenAiError::InvalidInput(
            "describe the object to remove".to_string(),
        ));
    }
    Ok(format!(
        "Supprime l'objet '{description}' de l'image. Remplis la zone de manière réaliste."
    ))
}

pub fn summarize_url(url: &str) -> String {
    format!(
        "Tâche : lis le contenu de l'URL suivante et rédige un résumé concis et informatif de l'article principal. \
         Ignore les publicités, les menus de navigation et les pieds de page. \
         Concentre-toi sur les points clés et les arguments principaux. L'URL est : {url}"
    )
}

macro_rules! choice_enum {
    ($(#[$meta:meta])* $name:ident ($kind:literal) { $($variant:ident => $slug:literal, $label:literal;)+ }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $($variant,)+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant,)+];

            pub fn slug(self) -> &'static str {
                match self {
                    $($name::$variant => $slug,)+
                }
            }

            /// Wording used in the prompt.
            pub fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.slug())
            }
        }

        impl FromStr for $name {
            type Err = ChoiceParseError;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                let wanted = s.trim().to_ascii_lowercase();
                $name::ALL
                    .iter()
                    .copied()
                    .find(|v| v.slug() == wanted)
                    .ok_or_else(|| {
                        let known: Vec<&str> = $name::ALL.iter().map(|v| v.slug()).collect();
                        ChoiceParseError {
                            kind: $kind,
                            value: s.to_string(),
                            expected: known.join(", "),
                        }
                    })
            }
        }
    };
}

choice_enum! {
    /// Outfit for the professional portrait.
    Attire ("attire") {
        SuitAndTie => "suit", "Costume et cravate";
        ElegantBlouse => "blouse", "Chemisier élégant";
        CasualShirt => "casual", "Chemise décontractée";
        Turtleneck => "turtleneck", "Col roulé sobre";
    }
}

choice_enum! {
    /// Scene behind the portrait subject.
    Backdrop ("backdrop") {
        ModernOffice => "office", "Bureau moderne (flou)";
        Outdoors => "outdoors", "Extérieur nature (flou)";
        Studio => "studio", "Studio (gris neutre)";
        BrickWall => "brick", "Mur de briques";
    }
}

choice_enum! {
    PortraitStyle ("portrait style") {
        Corporate => "corporate", "Corporate / Classique";
        Creative => "creative", "Créatif / Artistique";
        Tech => "tech", "Tech / Amical";
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortraitOptions {
    pub attire: Attire,
    pub backdrop: Backdrop,
    pub style: PortraitStyle,
}

impl Default for PortraitOptions {
    fn default() -> Self {
        Self {
            attire: Attire::SuitAndTie,
            backdrop: Backdrop::ModernOffice,
            style: PortraitStyle::Corporate,
        }
    }
}

pub fn portrait(options: &PortraitOptions) -> String {
    format!(
        "Transforme ce selfie en une photo de portrait professionnelle pour un profil LinkedIn. \
         Le visage, les traits et l'expression du sujet doivent être parfaitement préservés. \
         Changez la tenue pour une tenue de type \"{}\". \
         Remplacez l'arrière-plan par un arrière-plan professionnel de type \"{}\". \
         L'éclairage doit être doux et flatteur, typique d'un portrait de studio professionnel. \
         Le style général doit être \"{}\". Ne modifiez pas l'identité de la personne. \
         L'image finale doit être un portrait d'entreprise réaliste et de haute qualité.",
        options.attire.label(),
        options.backdrop.label(),
        options.style.label()
    )
}

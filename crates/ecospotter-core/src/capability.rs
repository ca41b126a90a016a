//! The three AI capabilities: typed inputs/outputs and prompt templates.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::schema::{
    parse_data_uri, CapabilitySchema, ECOLOGICAL_ADVICE, NEARBY_TREE_FINDER, SUBMISSION_ASSISTANT,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    EcologicalAdvice,
    SubmissionAssistant,
    NearbyTreeFinder,
}

impl Capability {
    pub fn name(&self) -> &'static str {
        match self {
            Capability::EcologicalAdvice => "ecologicalAdvice",
            Capability::SubmissionAssistant => "submissionAssistant",
            Capability::NearbyTreeFinder => "findTreesNearMe",
        }
    }

    pub fn schema(&self) -> &'static CapabilitySchema {
        match self {
            Capability::EcologicalAdvice => &ECOLOGICAL_ADVICE,
            Capability::SubmissionAssistant => &SUBMISSION_ASSISTANT,
            Capability::NearbyTreeFinder => &NEARBY_TREE_FINDER,
        }
    }

    /// Render the instruction for an input that already passed validation.
    pub fn render_prompt(&self, input: &Value) -> Prompt {
        match self {
            Capability::EcologicalAdvice => render_ecological_advice(input),
            Capability::SubmissionAssistant => render_submission_assistant(input),
            Capability::NearbyTreeFinder => render_tree_finder(input),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EcologicalAdviceInput {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EcologicalAdviceOutput {
    pub advice: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionAssistantInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_data_uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionAssistantOutput {
    pub species: String,
    pub characteristics: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindTreesInput {
    pub user_location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tree_species_preference: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindTreesOutput {
    pub tree_locations: String,
    #[serde(default)]
    pub additional_notes: Option<String>,
}

/// An inline image handed to the model next to the prompt text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Media {
    pub mime_type: String,
    /// Base64 payload without the `data:` prefix.
    pub data: String,
}

impl Media {
    pub fn from_data_uri(uri: &str) -> Option<Self> {
        let (mime_type, payload) = parse_data_uri(uri)?;
        Some(Self {
            mime_type: mime_type.to_string(),
            data: payload.chars().filter(|c| !c.is_whitespace()).collect(),
        })
    }

    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Prompt {
    pub text: String,
    pub media: Vec<Media>,
}

fn text_field<'a>(input: &'a Value, name: &str) -> Option<&'a str> {
    input.get(name).and_then(Value::as_str)
}

fn render_ecological_advice(input: &Value) -> Prompt {
    let query = text_field(input, "query").unwrap_or_default();
    let mut text = String::from(
        "Jesteś EcoAssistant AI, przyjaznym i BARDZO KONKRETNYM przewodnikiem po aplikacji EcoSpotter. \
         Twoim celem jest pomaganie użytkownikom w efektywnym korzystaniu z aplikacji oraz, w drugiej \
         kolejności, inspirowanie do działań ekologicznych.\n\n\
         Twoim priorytetem jest udzielenie jasnej i zwięzłej odpowiedzi na pytanie użytkownika. \
         Odpowiadaj wyłącznie w języku polskim.\n\n",
    );

    if let Some(path) = text_field(input, "currentPath") {
        text.push_str(&format!(
            "Użytkownik znajduje się obecnie na stronie: {}. Użyj tej informacji, aby Twoje odpowiedzi \
             były maksymalnie trafne.\n\n",
            path
        ));
    }

    text.push_str(&format!(
        "KROKI POSTĘPOWANIA:\n\
         1. NAJPIERW odpowiedz bezpośrednio na pytanie użytkownika: \"{query}\".\n\
         2. POTEM (jeśli to pasuje do kontekstu), dodaj krótką, pozytywną zachętę lub poradę ekologiczną. \
         Unikaj ogólników, jeśli pytanie jest o konkretną funkcję.\n\n\
         Przykładowe scenariusze:\n\
         - Na '/map' pytanie \"co tu widzę?\": to mapa wszystkich zgłoszonych drzew, znaczniki można klikać.\n\
         - Na '/submit' pytanie o dodanie drzewa: wypełnij gatunek, średnicę pnia, zdjęcie, opis i wskaż \
         lokalizację na mapie, potem kliknij 'Zgłoś drzewo'.\n\
         - Na '/community': to centrum weryfikacji, gdzie można głosować na zgłoszenia i przeglądać nadużycia.\n\
         - Na '/profile/...': użytkownik widzi swoje zgłoszenia, punkty i odznaki.\n\n\
         Pytanie użytkownika: {query}\n\n\
         Twoja konkretna odpowiedź:"
    ));

    Prompt {
        text,
        media: Vec::new(),
    }
}

fn render_submission_assistant(input: &Value) -> Prompt {
    let mut text = String::from(
        "Jesteś ekspertem botaniki i pasjonatem ekologii. Twoim celem jest pomoc użytkownikowi aplikacji \
         EcoSpotter w zidentyfikowaniu i zgłoszeniu nowego drzewa. Każde skatalogowane drzewo to \
         zwycięstwo dla naszej planety! Odpowiadaj wyłącznie w języku polskim.\n\n\
         Na podstawie dostarczonych informacji zidentyfikuj gatunek drzewa i opisz jego najważniejsze \
         cechy. Bądź zachęcający i podziękuj użytkownikowi za jego wkład.\n",
    );

    if let Some(description) = text_field(input, "description") {
        text.push_str(&format!("\nOpis: {}\n", description));
    }

    let media: Vec<Media> = text_field(input, "photoDataUri")
        .and_then(Media::from_data_uri)
        .into_iter()
        .collect();
    if !media.is_empty() {
        text.push_str("\nZdjęcie drzewa jest załączone do tej wiadomości.\n");
    }

    Prompt { text, media }
}

fn render_tree_finder(input: &Value) -> Prompt {
    let location = text_field(input, "userLocation").unwrap_or_default();
    let mut text = format!(
        "Jesteś EcoAssistant AI, przyjaznym przewodnikiem pomagającym użytkownikom łączyć się z naturą. \
         Twoim celem jest pomóc im znaleźć drzewa i docenić otaczające ich środowisko. Odpowiadaj \
         wyłącznie w języku polskim.\n\n\
         Użytkownik znajduje się obecnie w: {}.\n",
        location
    );

    if let Some(preference) = text_field(input, "treeSpeciesPreference") {
        text.push_str(&format!("Jego preferowany gatunek drzewa to: {}.\n", preference));
    }

    text.push_str(
        "\nZnajdź drzewa w pobliżu użytkownika i podaj ich lokalizacje. Bądź zachęcający i zaproponuj, \
         aby wyszli na zewnątrz i odkrywali.\n\
         Dostarczaj pomocnych i inspirujących notatek, takich jak wskazówki dojazdu, interesujące fakty o \
         drzewach lub ekologiczne znaczenie obszaru. Pamiętaj o promowaniu odpowiedzialnego korzystania z \
         natury.\n",
    );

    Prompt {
        text,
        media: Vec::new(),
    }
}

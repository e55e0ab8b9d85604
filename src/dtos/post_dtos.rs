use std::collections::{BTreeMap, HashMap};

use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use base64::{Engine as _, engine::general_purpose};
use futures::future::{Ready, ready};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

use crate::models::comment::Comment;
use crate::models::group::Group;
use crate::models::post::Post;
use crate::services::pagination::{Page, parse_page_number};

/// Field name -> messages. Empty means the form is valid.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    pub fn add(&mut self, field: &str, message: &str) {
        self.0.entry(field.to_string()).or_default().push(message.to_string());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[cfg(test)]
    pub fn field(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }
}

const NOT_AN_IMAGE: &str =
    "Upload a valid image. The file you uploaded was either not an image or a corrupted image.";
const NOT_A_FILE: &str = "The submitted data was not a file. Check the encoding type on the form.";
const EMPTY_FILE: &str = "The submitted file is empty.";

/// An image attached to a post form, sent as base64 (a `data:` URL prefix is accepted).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ImageUpload {
    #[serde(default)]
    pub file_name: String,
    pub content_type: String,
    #[serde(skip_serializing)]
    pub image_data: String,
}

/// Upload bytes that passed validation, with the file extension to store them under.
#[derive(Debug)]
pub struct DecodedImage {
    pub bytes: Vec<u8>,
    pub extension: String,
}

impl ImageUpload {
    /// Checks the declared type is `image/*` and decodes the payload.
    /// The error is the message shown next to the form field.
    pub fn decode(&self) -> Result<DecodedImage, &'static str> {
        let content_type: mime::Mime = self.content_type.trim().parse().map_err(|_| NOT_AN_IMAGE)?;
        if content_type.type_() != mime::IMAGE {
            return Err(NOT_AN_IMAGE);
        }

        let payload = match self.image_data.split_once(',') {
            Some((_, data)) => data,
            None => self.image_data.as_str(),
        };
        let bytes = general_purpose::STANDARD.decode(payload.trim()).map_err(|_| NOT_A_FILE)?;
        if bytes.is_empty() {
            return Err(EMPTY_FILE);
        }
        Ok(DecodedImage { bytes, extension: extension_for(&content_type) })
    }
}

fn extension_for(content_type: &mime::Mime) -> String {
    let subtype = content_type.subtype();
    if subtype == mime::JPEG {
        "jpg".to_string()
    } else if subtype.as_str().chars().all(|c| c.is_ascii_alphanumeric()) {
        subtype.as_str().to_ascii_lowercase()
    } else {
        "img".to_string()
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PostForm {
    #[serde(default)]
    pub text: String,
    pub group: Option<i64>,
    /// New image; on edit, leaving it out keeps the current one.
    pub image: Option<ImageUpload>,
}

impl PostForm {
    /// Text check only. Group existence and the image are checked by the service.
    pub fn validate(&self) -> FormErrors {
        let mut errors = FormErrors::default();
        if self.text.trim().is_empty() {
            errors.add("text", "This field is required.");
        }
        errors
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentForm {
    #[serde(default)]
    pub text: String,
}

impl CommentForm {
    pub fn validate(&self) -> FormErrors {
        let mut errors = FormErrors::default();
        if self.text.trim().is_empty() {
            errors.add("text", "This field is required.");
        }
        errors
    }
}

/// `?page=` on every feed route. Kept as a string so that garbage falls back to page 1.
#[derive(Debug, Default)]
pub struct PageQuery {
    pub page: Option<String>,
}

impl PageQuery {
    /// A repeated key keeps its last value; an unparseable query string is no page at all.
    pub fn from_query_string(query: &str) -> Self {
        match web::Query::<HashMap<String, String>>::from_query(query) {
            Ok(params) => Self { page: params.into_inner().remove("page") },
            Err(e) => {
                debug!("ignoring malformed query '{}': {}", query, e);
                Self::default()
            }
        }
    }

    pub fn number(&self) -> Option<i64> {
        parse_page_number(self.page.as_deref())
    }
}

impl FromRequest for PageQuery {
    type Error = AppError;
    type Future = Ready<Result<Self, AppError>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(Self::from_query_string(req.query_string())))
    }
}

#[derive(Debug, Serialize)]
pub struct IndexContext {
    pub page_obj: Page<Post>,
}

#[derive(Debug, Serialize)]
pub struct GroupContext {
    pub group: Group,
    pub page_obj: Page<Post>,
}

#[derive(Debug, Serialize)]
pub struct ProfileContext {
    pub author: crate::models::user::User,
    pub post_count: usize,
    pub following: bool,
    pub page_obj: Page<Post>,
}

#[derive(Debug, Serialize)]
pub struct PostDetailContext {
    pub post: Post,
    pub post_count: usize,
    pub comments: Vec<Comment>,
    pub can_edit: bool,
}

#[derive(Debug, Serialize)]
pub struct PostFormContext {
    pub is_edit: bool,
    pub post: Option<Post>,
    pub form: PostForm,
    pub errors: FormErrors,
    pub groups: Vec<Group>,
}

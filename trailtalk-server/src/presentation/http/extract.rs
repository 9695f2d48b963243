use axum::Json;
use axum::extract::multipart::MultipartError;
use axum::extract::{FromRequest, Multipart, Request};
use axum::http::{HeaderMap, header};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use utoipa::ToSchema;

use crate::domain::post::{CreatePostRequest, ImageFile, UpdatePostRequest};
use crate::infrastructure::uploads::UploadError;
use crate::presentation::AppState;
use crate::presentation::http::app_error::AppError;

/// JSON shape of a create/update body. Multipart forms use the same field names.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PostBodyDto {
    pub(crate) title: Option<String>,
    pub(crate) content: Option<String>,
    pub(crate) image_url: Option<String>,
    /// Array of tag labels, or a string holding a JSON array.
    #[schema(value_type = Option<Vec<String>>)]
    pub(crate) tags: Option<TagsField>,
    pub(crate) user_id: Option<String>,
    pub(crate) secret_key: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum TagsField {
    List(Vec<String>),
    Text(String),
}

impl TagsField {
    fn into_raw(self) -> Vec<String> {
        match self {
            TagsField::List(tags) => tags,
            TagsField::Text(raw) => vec![raw],
        }
    }
}

/// Create/update input after JSON or multipart parsing. Tags and the image are vetted later by the service.
#[derive(Debug, Default)]
pub(crate) struct PostForm {
    pub(crate) title: Option<String>,
    pub(crate) content: Option<String>,
    pub(crate) image_url: Option<String>,
    pub(crate) tags: Option<Vec<String>>,
    pub(crate) user_id: Option<String>,
    pub(crate) secret_key: Option<String>,
    pub(crate) image: Option<ImageFile>,
}

impl PostForm {
    pub(crate) fn into_create(self) -> (CreatePostRequest, Option<ImageFile>) {
        let req = CreatePostRequest {
            title: self.title,
            content: self.content,
            image_url: self.image_url,
            tags: self.tags,
            user_id: self.user_id,
            secret_key: self.secret_key,
        };
        (req, self.image)
    }

    pub(crate) fn into_update(self) -> (UpdatePostRequest, Option<ImageFile>) {
        let req = UpdatePostRequest {
            title: self.title,
            content: self.content,
            image_url: self.image_url,
            tags: self.tags,
            user_id: self.user_id,
            secret_key: self.secret_key,
        };
        (req, self.image)
    }
}

impl From<PostBodyDto> for PostForm {
    fn from(dto: PostBodyDto) -> Self {
        Self {
            title: dto.title,
            content: dto.content,
            image_url: dto.image_url,
            tags: dto.tags.map(TagsField::into_raw),
            user_id: dto.user_id,
            secret_key: dto.secret_key,
            image: None,
        }
    }
}

impl FromRequest<AppState> for PostForm {
    type Rejection = AppError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        if is_multipart(req.headers()) {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|err| AppError::BadRequest(err.body_text()))?;
            read_multipart(multipart, state.upload_max_bytes).await
        } else {
            let Json(dto) = Json::<PostBodyDto>::from_request(req, state)
                .await
                .map_err(|err| AppError::BadRequest(err.body_text()))?;
            Ok(PostForm::from(dto))
        }
    }
}

const IMAGE_FIELD: &str = "image";

fn is_multipart(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<mime::Mime>().ok())
        .is_some_and(|parsed| parsed.type_() == mime::MULTIPART && parsed.subtype() == mime::FORM_DATA)
}

async fn read_multipart(mut multipart: Multipart, max_bytes: usize) -> Result<PostForm, AppError> {
    let mut form = PostForm::default();

    while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();

        if let Some(file_name) = field.file_name().map(str::to_string) {
            if name != IMAGE_FIELD {
                return Err(AppError::BadRequest(format!("unexpected file field '{name}'")));
            }
            // browsers send an empty part when no file was picked
            if file_name.is_empty() {
                continue;
            }
            if form.image.is_some() {
                return Err(UploadError::MultipleImages.into());
            }

            let content_type = field.content_type().map(str::to_string);

            // one byte past the limit is enough for the sink to reject it
            let mut bytes = Vec::new();
            while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
                let room = (max_bytes + 1).saturating_sub(bytes.len());
                bytes.extend_from_slice(&chunk[..chunk.len().min(room)]);
            }

            form.image = Some(ImageFile {
                file_name,
                content_type: content_type.unwrap_or_default(),
                bytes,
            });
            continue;
        }

        let value = field.text().await.map_err(multipart_error)?;
        match name.as_str() {
            "title" => form.title = Some(value),
            "content" => form.content = Some(value),
            "imageUrl" => form.image_url = Some(value),
            "tags" | "tags[]" => form.tags.get_or_insert_with(Vec::new).push(value),
            "userId" => form.user_id = Some(value),
            "secretKey" => form.secret_key = Some(value),
            _ => {}
        }
    }

    Ok(form)
}

fn multipart_error(err: MultipartError) -> AppError {
    AppError::BadRequest(err.body_text())
}

/// Lenient JSON body for endpoints whose body is optional; blank means `{}`.
pub(crate) fn parse_json_body<T>(body: &[u8]) -> Result<T, AppError>
where
    T: DeserializeOwned + Default,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body)
        .map_err(|err| AppError::BadRequest(format!("invalid JSON body: {err}")))
}

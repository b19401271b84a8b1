//! 服务测试用的内存仓储与端口假件

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::{
    DomainError, DomainResult, Page, Pagination, Readme, Template, User, Verification, Widget,
};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use crate::clock::Clock;
use crate::context::OpContext;
use crate::image_store::{ImageStore, ImageStoreError};
use crate::mailer::{Mailer, MailerError};
use crate::repository::{
    AttemptsOutcome, ReadmeRepository, TemplateRepository, UpdateFields, UserRepository,
    VerificationRepository, WidgetRepository,
};
use crate::search::{SearchError, SearchIndex};

fn as_string_vec(value: &Value) -> Vec<String> {
    value
        .as_array()
        .map(|arr| {
            arr.iter()
                .filter_map(|v| v.as_str().map(str::to_owned))
                .collect()
        })
        .unwrap_or_default()
}

fn as_string_map(value: &Value) -> HashMap<String, String> {
    value
        .as_object()
        .map(|obj| {
            obj.iter()
                .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_owned())))
                .collect()
        })
        .unwrap_or_default()
}

// ---------------------------------------------------------------- users

#[derive(Default)]
pub struct InMemoryUsers {
    pub rows: Mutex<HashMap<Uuid, User>>,
}

impl InMemoryUsers {
    pub fn with(users: Vec<User>) -> Self {
        Self {
            rows: Mutex::new(users.into_iter().map(|u| (u.id, u)).collect()),
        }
    }

    pub fn get(&self, id: Uuid) -> Option<User> {
        self.rows.lock().unwrap().get(&id).cloned()
    }
}

#[async_trait]
impl UserRepository for InMemoryUsers {
    async fn create(&self, _ctx: &OpContext, user: &User) -> DomainResult<User> {
        let mut rows = self.rows.lock().unwrap();
        if rows.values().any(|u| {
            u.email == user.email || u.login == user.login || u.nickname == user.nickname
        }) {
            return Err(DomainError::already_exists("user"));
        }
        rows.insert(user.id, user.clone());
        Ok(user.clone())
    }

    async fn get_by_id(&self, _ctx: &OpContext, id: Uuid) -> DomainResult<User> {
        self.get(id).ok_or(DomainError::not_found("user"))
    }

    async fn get_by_login(&self, _ctx: &OpContext, login: &str) -> DomainResult<User> {
        self.rows
            .lock()
            .unwrap()
            .values()
            .find(|u| u.login == login)
            .cloned()
            .ok_or(DomainError::not_found("user"))
    }

    async fn get_by_email(&self, _ctx: &OpContext, email: &str) -> DomainResult<User> {
        self.rows
            .lock()
            .unwrap()
            .values()
            .find(|u| u.email == email)
            .cloned()
            .ok_or(DomainError::not_found("user"))
    }

    async fn identity_taken(
        &self,
        _ctx: &OpContext,
        email: &str,
        login: &str,
        nickname: &str,
    ) -> DomainResult<bool> {
        Ok(self.rows.lock().unwrap().values().any(|u| {
            u.email == email || u.login == login || u.nickname == nickname
        }))
    }

    async fn update(&self, _ctx: &OpContext, id: Uuid, fields: UpdateFields) -> DomainResult<User> {
        let mut rows = self.rows.lock().unwrap();
        let user = rows.get_mut(&id).ok_or(DomainError::not_found("user"))?;
        for (key, value) in &fields {
            match key.as_str() {
                "nickname" => user.nickname = value.as_str().unwrap_or_default().to_owned(),
                "login" => user.login = value.as_str().unwrap_or_default().to_owned(),
                "email" => user.email = value.as_str().unwrap_or_default().to_owned(),
                "avatar" => user.avatar = value.as_str().unwrap_or_default().to_owned(),
                other => return Err(DomainError::invalid_fields(vec![other.to_owned()])),
            }
        }
        Ok(user.clone())
    }

    async fn delete(&self, _ctx: &OpContext, id: Uuid) -> DomainResult<()> {
        self.rows
            .lock()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or(DomainError::not_found("user"))
    }

    async fn increment_readmes(&self, _ctx: &OpContext, id: Uuid) -> DomainResult<()> {
        let mut rows = self.rows.lock().unwrap();
        let user = rows.get_mut(&id).ok_or(DomainError::not_found("user"))?;
        user.num_of_readmes += 1;
        Ok(())
    }

    async fn increment_templates(&self, _ctx: &OpContext, id: Uuid) -> DomainResult<()> {
        let mut rows = self.rows.lock().unwrap();
        let user = rows.get_mut(&id).ok_or(DomainError::not_found("user"))?;
        user.num_of_templates += 1;
        Ok(())
    }

    async fn decrement_readmes(&self, _ctx: &OpContext, id: Uuid) -> DomainResult<()> {
        let mut rows = self.rows.lock().unwrap();
        let user = rows.get_mut(&id).ok_or(DomainError::not_found("user"))?;
        user.num_of_readmes = (user.num_of_readmes - 1).max(0);
        Ok(())
    }

    async fn decrement_templates(&self, _ctx: &OpContext, id: Uuid) -> DomainResult<()> {
        let mut rows = self.rows.lock().unwrap();
        let user = rows.get_mut(&id).ok_or(DomainError::not_found("user"))?;
        user.num_of_templates = (user.num_of_templates - 1).max(0);
        Ok(())
    }

    async fn add_favorite_template(
        &self,
        _ctx: &OpContext,
        user_id: Uuid,
        template_id: Uuid,
    ) -> DomainResult<bool> {
        let mut rows = self.rows.lock().unwrap();
        let user = rows.get_mut(&user_id).ok_or(DomainError::not_found("user"))?;
        if user.favorite_templates.contains(&template_id) {
            return Ok(false);
        }
        user.favorite_templates.push(template_id);
        Ok(true)
    }

    async fn remove_favorite_template(
        &self,
        _ctx: &OpContext,
        user_id: Uuid,
        template_id: Uuid,
    ) -> DomainResult<bool> {
        let mut rows = self.rows.lock().unwrap();
        let user = rows.get_mut(&user_id).ok_or(DomainError::not_found("user"))?;
        let before = user.favorite_templates.len();
        user.favorite_templates.retain(|id| *id != template_id);
        Ok(user.favorite_templates.len() != before)
    }

    async fn add_favorite_widget(
        &self,
        _ctx: &OpContext,
        user_id: Uuid,
        widget_id: Uuid,
    ) -> DomainResult<bool> {
        let mut rows = self.rows.lock().unwrap();
        let user = rows.get_mut(&user_id).ok_or(DomainError::not_found("user"))?;
        if user.favorite_widgets.contains(&widget_id) {
            return Ok(false);
        }
        user.favorite_widgets.push(widget_id);
        Ok(true)
    }

    async fn remove_favorite_widget(
        &self,
        _ctx: &OpContext,
        user_id: Uuid,
        widget_id: Uuid,
    ) -> DomainResult<bool> {
        let mut rows = self.rows.lock().unwrap();
        let user = rows.get_mut(&user_id).ok_or(DomainError::not_found("user"))?;
        let before = user.favorite_widgets.len();
        user.favorite_widgets.retain(|id| *id != widget_id);
        Ok(user.favorite_widgets.len() != before)
    }
}

// -------------------------------------------------------- verifications

#[derive(Default)]
pub struct InMemoryVerifications {
    pub rows: Mutex<HashMap<String, Verification>>,
}

impl InMemoryVerifications {
    pub fn get(&self, email: &str) -> Option<Verification> {
        self.rows.lock().unwrap().get(email).cloned()
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

#[async_trait]
impl VerificationRepository for InMemoryVerifications {
    async fn create(&self, _ctx: &OpContext, verification: &Verification) -> DomainResult<()> {
        let mut rows = self.rows.lock().unwrap();
        if rows.contains_key(&verification.email) {
            return Err(DomainError::already_exists("verification"));
        }
        rows.insert(verification.email.clone(), verification.clone());
        Ok(())
    }

    async fn get_by_email(&self, _ctx: &OpContext, email: &str) -> DomainResult<Verification> {
        self.get(email).ok_or(DomainError::not_found("verification"))
    }

    async fn overwrite(
        &self,
        _ctx: &OpContext,
        email: &str,
        code: &[u8],
        expired_time: DateTime<Utc>,
        attempts: i32,
    ) -> DomainResult<()> {
        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .get_mut(email)
            .ok_or(DomainError::not_found("verification"))?;
        row.code = code.to_vec();
        row.expired_time = expired_time;
        row.attempts = attempts;
        Ok(())
    }

    async fn find_by_email_and_code(
        &self,
        _ctx: &OpContext,
        email: &str,
        code: &[u8],
    ) -> DomainResult<Option<Verification>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .get(email)
            .filter(|row| row.code == code)
            .cloned())
    }

    async fn decrement_attempts(
        &self,
        _ctx: &OpContext,
        email: &str,
    ) -> DomainResult<AttemptsOutcome> {
        let mut rows = self.rows.lock().unwrap();
        match rows.get_mut(email) {
            None => Ok(AttemptsOutcome::NotFound),
            // attempts 已经是 0：再减会违反检查约束
            Some(row) if row.attempts == 0 => Ok(AttemptsOutcome::Exhausted),
            Some(row) => {
                row.attempts -= 1;
                Ok(AttemptsOutcome::Decremented)
            }
        }
    }

    async fn delete(&self, _ctx: &OpContext, email: &str) -> DomainResult<()> {
        self.rows
            .lock()
            .unwrap()
            .remove(email)
            .map(|_| ())
            .ok_or(DomainError::not_found("verification"))
    }

    async fn purge_expired(&self, _ctx: &OpContext, now: DateTime<Utc>) -> DomainResult<u64> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|_, row| row.expired_time > now);
        Ok((before - rows.len()) as u64)
    }
}

// ----------------------------------------------------------- templates

#[derive(Default)]
pub struct InMemoryTemplates {
    pub rows: Mutex<HashMap<Uuid, Template>>,
}

impl InMemoryTemplates {
    pub fn with(templates: Vec<Template>) -> Self {
        Self {
            rows: Mutex::new(templates.into_iter().map(|t| (t.id, t)).collect()),
        }
    }

    pub fn get(&self, id: Uuid) -> Option<Template> {
        self.rows.lock().unwrap().get(&id).cloned()
    }
}

#[async_trait]
impl TemplateRepository for InMemoryTemplates {
    async fn create(&self, _ctx: &OpContext, template: &Template) -> DomainResult<Template> {
        self.rows
            .lock()
            .unwrap()
            .insert(template.id, template.clone());
        Ok(template.clone())
    }

    async fn get_by_id(&self, _ctx: &OpContext, id: Uuid) -> DomainResult<Template> {
        self.get(id).ok_or(DomainError::not_found("template"))
    }

    async fn get_many(&self, _ctx: &OpContext, ids: &[Uuid]) -> DomainResult<Vec<Template>> {
        let rows = self.rows.lock().unwrap();
        Ok(ids.iter().filter_map(|id| rows.get(id).cloned()).collect())
    }

    async fn list_public(
        &self,
        _ctx: &OpContext,
        pagination: Pagination,
    ) -> DomainResult<Page<Template>> {
        let rows = self.rows.lock().unwrap();
        let mut all: Vec<Template> = rows.values().filter(|t| t.is_public).cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        let total = all.len() as u64;
        let items = all
            .into_iter()
            .skip(pagination.offset() as usize)
            .take(pagination.limit() as usize)
            .collect();
        Ok(Page::new(items, total, pagination))
    }

    async fn list_by_owner(
        &self,
        _ctx: &OpContext,
        owner_id: Uuid,
        pagination: Pagination,
    ) -> DomainResult<Page<Template>> {
        let rows = self.rows.lock().unwrap();
        let mut all: Vec<Template> = rows
            .values()
            .filter(|t| t.owner_id == owner_id)
            .cloned()
            .collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        let total = all.len() as u64;
        let items = all
            .into_iter()
            .skip(pagination.offset() as usize)
            .take(pagination.limit() as usize)
            .collect();
        Ok(Page::new(items, total, pagination))
    }

    async fn update(
        &self,
        _ctx: &OpContext,
        id: Uuid,
        fields: UpdateFields,
    ) -> DomainResult<Template> {
        let mut rows = self.rows.lock().unwrap();
        let template = rows.get_mut(&id).ok_or(DomainError::not_found("template"))?;
        for (key, value) in &fields {
            match key.as_str() {
                "title" => template.title = value.as_str().unwrap_or_default().to_owned(),
                "image" => template.image = value.as_str().unwrap_or_default().to_owned(),
                "description" => {
                    template.description = value.as_str().unwrap_or_default().to_owned()
                }
                "text_blocks" => template.text_blocks = as_string_vec(value),
                "links" => template.links = as_string_vec(value),
                "widgets" => template.widgets = as_string_map(value),
                "render_order" => template.render_order = as_string_vec(value),
                "is_public" => template.is_public = value.as_bool().unwrap_or(template.is_public),
                other => return Err(DomainError::invalid_fields(vec![other.to_owned()])),
            }
        }
        template.last_updated_at = Utc::now();
        Ok(template.clone())
    }

    async fn delete(&self, _ctx: &OpContext, id: Uuid) -> DomainResult<()> {
        self.rows
            .lock()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or(DomainError::not_found("template"))
    }

    async fn increment_users(&self, _ctx: &OpContext, id: Uuid) -> DomainResult<()> {
        let mut rows = self.rows.lock().unwrap();
        let template = rows.get_mut(&id).ok_or(DomainError::not_found("template"))?;
        template.num_of_users += 1;
        Ok(())
    }

    async fn add_like(&self, _ctx: &OpContext, id: Uuid) -> DomainResult<()> {
        let mut rows = self.rows.lock().unwrap();
        let template = rows.get_mut(&id).ok_or(DomainError::not_found("template"))?;
        template.likes += 1;
        Ok(())
    }

    async fn remove_like(&self, _ctx: &OpContext, id: Uuid) -> DomainResult<()> {
        let mut rows = self.rows.lock().unwrap();
        let template = rows.get_mut(&id).ok_or(DomainError::not_found("template"))?;
        template.likes = (template.likes - 1).max(0);
        Ok(())
    }

    async fn page_all(
        &self,
        _ctx: &OpContext,
        limit: i64,
        offset: i64,
    ) -> DomainResult<Vec<Template>> {
        let rows = self.rows.lock().unwrap();
        let mut all: Vec<Template> = rows.values().cloned().collect();
        all.sort_by_key(|t| t.id);
        Ok(all
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }
}

// ------------------------------------------------------------- widgets

#[derive(Default)]
pub struct InMemoryWidgets {
    pub rows: Mutex<HashMap<Uuid, Widget>>,
}

impl InMemoryWidgets {
    pub fn with(widgets: Vec<Widget>) -> Self {
        Self {
            rows: Mutex::new(widgets.into_iter().map(|w| (w.id, w)).collect()),
        }
    }

    pub fn get(&self, id: Uuid) -> Option<Widget> {
        self.rows.lock().unwrap().get(&id).cloned()
    }
}

#[async_trait]
impl WidgetRepository for InMemoryWidgets {
    async fn get_by_id(&self, _ctx: &OpContext, id: Uuid) -> DomainResult<Widget> {
        self.get(id).ok_or(DomainError::not_found("widget"))
    }

    async fn get_many(&self, _ctx: &OpContext, ids: &[Uuid]) -> DomainResult<Vec<Widget>> {
        let rows = self.rows.lock().unwrap();
        Ok(ids.iter().filter_map(|id| rows.get(id).cloned()).collect())
    }

    async fn list(&self, _ctx: &OpContext, pagination: Pagination) -> DomainResult<Page<Widget>> {
        let rows = self.rows.lock().unwrap();
        let mut all: Vec<Widget> = rows.values().cloned().collect();
        all.sort_by_key(|w| w.id);
        let total = all.len() as u64;
        let items = all
            .into_iter()
            .skip(pagination.offset() as usize)
            .take(pagination.limit() as usize)
            .collect();
        Ok(Page::new(items, total, pagination))
    }

    async fn update(
        &self,
        _ctx: &OpContext,
        id: Uuid,
        fields: UpdateFields,
    ) -> DomainResult<Widget> {
        let mut rows = self.rows.lock().unwrap();
        let widget = rows.get_mut(&id).ok_or(DomainError::not_found("widget"))?;
        for (key, value) in &fields {
            match key.as_str() {
                "title" => widget.title = value.as_str().unwrap_or_default().to_owned(),
                "image" => widget.image = value.as_str().unwrap_or_default().to_owned(),
                "description" => widget.description = value.as_str().unwrap_or_default().to_owned(),
                "widget_type" => widget.widget_type = value.as_str().unwrap_or_default().to_owned(),
                "tags" => widget.tags = as_string_map(value),
                "link" => widget.link = value.as_str().unwrap_or_default().to_owned(),
                other => return Err(DomainError::invalid_fields(vec![other.to_owned()])),
            }
        }
        Ok(widget.clone())
    }

    async fn increment_users(&self, _ctx: &OpContext, ids: &[Uuid]) -> DomainResult<()> {
        let mut rows = self.rows.lock().unwrap();
        for id in ids {
            let widget = rows.get_mut(id).ok_or(DomainError::not_found("widget"))?;
            widget.num_of_users += 1;
        }
        Ok(())
    }

    async fn add_like(&self, _ctx: &OpContext, id: Uuid) -> DomainResult<()> {
        let mut rows = self.rows.lock().unwrap();
        let widget = rows.get_mut(&id).ok_or(DomainError::not_found("widget"))?;
        widget.likes += 1;
        Ok(())
    }

    async fn remove_like(&self, _ctx: &OpContext, id: Uuid) -> DomainResult<()> {
        let mut rows = self.rows.lock().unwrap();
        let widget = rows.get_mut(&id).ok_or(DomainError::not_found("widget"))?;
        widget.likes = (widget.likes - 1).max(0);
        Ok(())
    }

    async fn page_all(
        &self,
        _ctx: &OpContext,
        limit: i64,
        offset: i64,
    ) -> DomainResult<Vec<Widget>> {
        let rows = self.rows.lock().unwrap();
        let mut all: Vec<Widget> = rows.values().cloned().collect();
        all.sort_by_key(|w| w.id);
        Ok(all
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }
}

// ------------------------------------------------------------- readmes

#[derive(Default)]
pub struct InMemoryReadmes {
    pub rows: Mutex<HashMap<Uuid, Readme>>,
}

impl InMemoryReadmes {
    pub fn get(&self, id: Uuid) -> Option<Readme> {
        self.rows.lock().unwrap().get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

#[async_trait]
impl ReadmeRepository for InMemoryReadmes {
    async fn create(&self, _ctx: &OpContext, readme: &Readme) -> DomainResult<Readme> {
        self.rows.lock().unwrap().insert(readme.id, readme.clone());
        Ok(readme.clone())
    }

    async fn get_by_id(&self, _ctx: &OpContext, id: Uuid) -> DomainResult<Readme> {
        self.get(id).ok_or(DomainError::not_found("readme"))
    }

    async fn list_by_owner(
        &self,
        _ctx: &OpContext,
        owner_id: Uuid,
        pagination: Pagination,
    ) -> DomainResult<Page<Readme>> {
        let rows = self.rows.lock().unwrap();
        let mut all: Vec<Readme> = rows
            .values()
            .filter(|r| r.owner_id == owner_id)
            .cloned()
            .collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        let total = all.len() as u64;
        let items = all
            .into_iter()
            .skip(pagination.offset() as usize)
            .take(pagination.limit() as usize)
            .collect();
        Ok(Page::new(items, total, pagination))
    }

    async fn update(
        &self,
        _ctx: &OpContext,
        id: Uuid,
        fields: UpdateFields,
    ) -> DomainResult<Readme> {
        let mut rows = self.rows.lock().unwrap();
        let readme = rows.get_mut(&id).ok_or(DomainError::not_found("readme"))?;
        for (key, value) in &fields {
            match key.as_str() {
                "title" => readme.title = value.as_str().unwrap_or_default().to_owned(),
                "image" => readme.image = value.as_str().unwrap_or_default().to_owned(),
                "text_blocks" => readme.text_blocks = as_string_vec(value),
                "links" => readme.links = as_string_vec(value),
                "widgets" => readme.widgets = as_string_map(value),
                "render_order" => readme.render_order = as_string_vec(value),
                other => return Err(DomainError::invalid_fields(vec![other.to_owned()])),
            }
        }
        readme.last_updated_at = Utc::now();
        Ok(readme.clone())
    }

    async fn delete(&self, _ctx: &OpContext, id: Uuid) -> DomainResult<()> {
        self.rows
            .lock()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or(DomainError::not_found("readme"))
    }
}

// --------------------------------------------------------------- ports

/// 记录发出的验证码，测试用
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<(String, String, String)>>,
}

impl RecordingMailer {
    pub fn last_code(&self) -> Option<String> {
        self.sent.lock().unwrap().last().map(|(_, _, code)| code.clone())
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send_verification_code(
        &self,
        to: &str,
        nickname: &str,
        code: &str,
    ) -> Result<(), MailerError> {
        self.sent
            .lock()
            .unwrap()
            .push((to.to_owned(), nickname.to_owned(), code.to_owned()));
        Ok(())
    }
}

/// 可拨动的固定时钟
pub struct FixedClock {
    pub now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn at(now: DateTime<Utc>) -> Self {
        Self { now: Mutex::new(now) }
    }

    pub fn advance(&self, duration: chrono::Duration) {
        let mut now = self.now.lock().unwrap();
        *now += duration;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

/// 记录 upsert、按预置结果应答查询的索引假件
#[derive(Default)]
pub struct RecordingSearch {
    pub upserts: Mutex<Vec<(String, Vec<serde_json::Value>)>>,
    pub results: Mutex<Vec<Uuid>>,
}

#[async_trait]
impl SearchIndex for RecordingSearch {
    async fn upsert(
        &self,
        index: &str,
        docs: Vec<serde_json::Value>,
    ) -> Result<(), SearchError> {
        self.upserts.lock().unwrap().push((index.to_owned(), docs));
        Ok(())
    }

    async fn search_ids(
        &self,
        _index: &str,
        _query: &str,
        _limit: usize,
    ) -> Result<Vec<Uuid>, SearchError> {
        Ok(self.results.lock().unwrap().clone())
    }
}

/// 返回固定 URL 的图床假件
#[derive(Default)]
pub struct StubImageStore;

#[async_trait]
impl ImageStore for StubImageStore {
    async fn upload(&self, _bytes: Vec<u8>, filename: &str) -> Result<String, ImageStoreError> {
        Ok(format!("https://img.test/{}", filename))
    }
}

// ------------------------------------------------------------ fixtures

pub fn sample_user(nickname: &str, login: &str, email: &str) -> User {
    User::from_verified(nickname, login, email, "$2b$12$fixture", Utc::now())
}

pub fn sample_template(owner_id: Uuid, title: &str) -> Template {
    Template {
        id: Uuid::new_v4(),
        owner_id,
        title: title.to_owned(),
        image: String::new(),
        description: format!("{} description", title),
        text_blocks: vec!["intro".to_owned()],
        links: vec![],
        widgets: HashMap::new(),
        render_order: vec!["intro".to_owned()],
        likes: 0,
        num_of_users: 0,
        created_at: Utc::now(),
        last_updated_at: Utc::now(),
        is_public: true,
    }
}

pub fn sample_widget(title: &str) -> Widget {
    Widget {
        id: Uuid::new_v4(),
        title: title.to_owned(),
        image: String::new(),
        description: format!("{} description", title),
        widget_type: "stats".to_owned(),
        tags: HashMap::new(),
        link: "https://widgets.test".to_owned(),
        likes: 0,
        num_of_users: 0,
    }
}

//! Study materials grouped by subject.

use crate::api::{MaterialPayload, MaterialView};
use crate::db::repository::FullRepository;
use crate::models::{Material, MaterialId, NewMaterial, SubjectId};

use super::error::{LookupExt, ServiceError, ServiceResult};
use super::permissions::{authorize, ensure_author, Action, Principal, Resource};
use super::render::{self, render_all};
use super::validation::{require, validate_with, BLANK};

pub async fn list_all_materials<R: FullRepository + ?Sized>(
    repo: &R,
    principal: Option<&Principal>,
) -> ServiceResult<Vec<MaterialView>> {
    authorize(principal, Resource::Material, Action::List)?;
    let materials = repo.list_materials(None).await?;
    Ok(render_all!(repo, materials, render::material))
}

/// Materials of one subject, ordered by class number.
pub async fn list_subject_materials<R: FullRepository + ?Sized>(
    repo: &R,
    principal: Option<&Principal>,
    subject_id: SubjectId,
) -> ServiceResult<Vec<MaterialView>> {
    authorize(principal, Resource::Material, Action::List)?;
    repo.get_subject(subject_id).await.or_not_found()?;
    let materials = repo.list_materials(Some(subject_id)).await?;
    Ok(render_all!(repo, materials, render::material))
}

async fn material_of<R: FullRepository + ?Sized>(
    repo: &R,
    subject_id: SubjectId,
    id: MaterialId,
) -> ServiceResult<Material> {
    let material = repo.get_material(id).await.or_not_found()?;
    if material.subject_id != subject_id {
        return Err(ServiceError::not_found());
    }
    Ok(material)
}

pub async fn get_material<R: FullRepository + ?Sized>(
    repo: &R,
    principal: Option<&Principal>,
    subject_id: SubjectId,
    id: MaterialId,
) -> ServiceResult<MaterialView> {
    authorize(principal, Resource::Material, Action::Retrieve)?;
    let material = material_of(repo, subject_id, id).await?;
    render::material(repo, &material).await
}

pub async fn create_material<R: FullRepository + ?Sized>(
    repo: &R,
    principal: Option<&Principal>,
    subject_id: SubjectId,
    payload: MaterialPayload,
) -> ServiceResult<MaterialView> {
    let principal = authorize(principal, Resource::Material, Action::Create)?;
    let teacher = principal.teacher()?;
    let subject = repo.get_subject(subject_id).await.or_not_found()?;

    validate_with(&payload, |checks| {
        checks.required("title", payload.title.as_ref());
        checks.required("section", payload.section.as_ref());
        checks.required("content", payload.content.as_ref());
        checks.required("class_number", payload.class_number);
        if matches!(&payload.content, Some(c) if c.trim().is_empty()) {
            checks.add("content", BLANK);
        }
    })?;

    let material = repo
        .create_material(NewMaterial {
            title: require("title", payload.title)?,
            section: require("section", payload.section)?,
            content: require("content", payload.content)?,
            class_number: require("class_number", payload.class_number)?,
            subject_id: subject.id,
            video_url: payload.video_url,
            author_id: teacher.id,
        })
        .await?;

    log::info!(
        "Material {} '{}' added to {}",
        material.id,
        material.title,
        subject.title
    );
    render::material(repo, &material).await
}

pub async fn update_material<R: FullRepository + ?Sized>(
    repo: &R,
    principal: Option<&Principal>,
    subject_id: SubjectId,
    id: MaterialId,
    payload: MaterialPayload,
) -> ServiceResult<MaterialView> {
    let principal = authorize(principal, Resource::Material, Action::Update)?;
    let teacher = principal.teacher()?;
    let mut material = material_of(repo, subject_id, id).await?;
    ensure_author(material.author_id == teacher.id)?;

    validate_with(&payload, |checks| {
        if matches!(&payload.content, Some(c) if c.trim().is_empty()) {
            checks.add("content", BLANK);
        }
    })?;

    if let Some(title) = payload.title {
        material.title = title;
    }
    if let Some(section) = payload.section {
        material.section = section;
    }
    if let Some(content) = payload.content {
        material.content = content;
    }
    if let Some(class_number) = payload.class_number {
        material.class_number = class_number;
    }
    if payload.video_url.is_some() {
        material.video_url = payload.video_url;
    }

    let material = repo.update_material(&material).await?;
    render::material(repo, &material).await
}

pub async fn delete_material<R: FullRepository + ?Sized>(
    repo: &R,
    principal: Option<&Principal>,
    subject_id: SubjectId,
    id: MaterialId,
) -> ServiceResult<()> {
    let principal = authorize(principal, Resource::Material, Action::Destroy)?;
    let teacher = principal.teacher()?;
    let material = material_of(repo, subject_id, id).await?;
    ensure_author(material.author_id == teacher.id)?;

    repo.delete_material(id).await.or_not_found()?;
    log::info!("Material {} deleted by teacher {}", id, teacher.id);
    Ok(())
}

//! The menu controller and its workflows.
//!
//! A workflow is a stack of pending [`Step`]s. Running a step either
//! finishes it, pushes follow-up steps (a retry with the same parents, or
//! chained offers such as "add another place?"), backs out of it, or
//! abandons the whole stack for the main menu. No step calls another
//! directly, so back-tracking never grows the call stack.

use std::sync::Arc;

use atlas_media::{ImageCodec, MediaStore};
use atlas_services::{Coordinates, ImageFetcher, PhotoLibrary, PlaceLookup, Suggestion};
use atlas_store::{EntityRepository, WriteBatch};
use atlas_types::{
    sort_destinations, sort_places, Album, Decimal, Destination, Education, Entity, Job, Photo,
    Place, Record, ResumeKind, Skill, SortKey,
};
use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};

use crate::editor::{edit_entity, fill_entity};
use crate::error::{NavError, NavResult};
use crate::import::PhotoImporter;
use crate::menu::{self, Operation, Section};
use crate::preload::AlbumPreload;
use crate::prompt::{ask_text, choose, Prompter};
use crate::rank::{rank_albums, SUGGESTION_LIMIT};
use crate::selection::{parse_text, Controls, Flow, Selection, TextInput};

/// External services the navigator works with.
#[derive(Clone)]
pub struct Collaborators {
    pub places: Arc<dyn PlaceLookup>,
    pub library: Arc<dyn PhotoLibrary>,
    pub fetcher: Arc<dyn ImageFetcher>,
    pub media: Arc<dyn MediaStore>,
    pub codec: Arc<dyn ImageCodec>,
}

/// How an executed operation ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Completed, declined or backed out of; stay in the sub-menu.
    Finished,
    /// The operator asked for the main menu.
    MainMenu,
}

#[derive(Clone, Debug)]
enum Step {
    AddDestination,
    AddPlace {
        destination: Option<Destination>,
    },
    OfferAlbum {
        destination: Destination,
        place: Place,
    },
    OfferAnotherPlace {
        destination: Destination,
    },
    AddAlbum {
        destination: Option<Destination>,
        place: Option<Place>,
    },
    OfferPhotos {
        album: Album,
    },
    AddPhotos {
        destination: Option<Destination>,
    },
    SetAlbumCover {
        destination: Option<Destination>,
    },
    EditDestination,
    EditPlace {
        destination: Option<Destination>,
    },
    DeleteDestination,
    DeletePlace {
        destination: Option<Destination>,
    },
    AddResumeEntry(ResumeKind),
    UpdateHomePhotos,
}

impl Step {
    fn name(&self) -> &'static str {
        match self {
            Self::AddDestination => "add_destination",
            Self::AddPlace { .. } => "add_place",
            Self::OfferAlbum { .. } => "offer_album",
            Self::OfferAnotherPlace { .. } => "offer_another_place",
            Self::AddAlbum { .. } => "add_album",
            Self::OfferPhotos { .. } => "offer_photos",
            Self::AddPhotos { .. } => "add_photos",
            Self::SetAlbumCover { .. } => "set_album_cover",
            Self::EditDestination => "edit_destination",
            Self::EditPlace { .. } => "edit_place",
            Self::DeleteDestination => "delete_destination",
            Self::DeletePlace { .. } => "delete_place",
            Self::AddResumeEntry(_) => "add_resume_entry",
            Self::UpdateHomePhotos => "update_home_photos",
        }
    }
}

enum StepOutcome {
    Done,
    /// Run these next, first element first.
    Then(Vec<Step>),
    Back,
    MainMenu,
}

impl StepOutcome {
    fn retry(step: Step) -> Self {
        Self::Then(vec![step])
    }
}

/// Leaving a step before its first question was answered: re-pick the
/// parent chosen inside the step, or go back out if the parent was given.
fn back_out(picked_here: bool, retry: Step) -> StepOutcome {
    if picked_here {
        StepOutcome::retry(retry)
    } else {
        StepOutcome::Back
    }
}

/// Menu-driven controller over the repository, media pipeline and
/// collaborators.
pub struct Navigator {
    repo: EntityRepository,
    places: Arc<dyn PlaceLookup>,
    fetcher: Arc<dyn ImageFetcher>,
    importer: PhotoImporter,
    preload: AlbumPreload,
    prompter: Arc<dyn Prompter>,
}

impl Navigator {
    pub fn new(
        repo: EntityRepository,
        collaborators: Collaborators,
        preload: AlbumPreload,
        prompter: Arc<dyn Prompter>,
    ) -> Self {
        let importer = PhotoImporter::new(
            repo.clone(),
            collaborators.library,
            collaborators.media,
            collaborators.codec,
        );
        Self {
            repo,
            places: collaborators.places,
            fetcher: collaborators.fetcher,
            importer,
            preload,
            prompter,
        }
    }

    pub fn preload(&self) -> &AlbumPreload {
        &self.preload
    }

    fn prompter(&self) -> &dyn Prompter {
        self.prompter.as_ref()
    }

    // ---------------------------------------------------------------
    // Menus
    // ---------------------------------------------------------------

    /// Run the main menu until the operator exits. The album preload is
    /// cancelled on the way out, however the session ends.
    pub async fn run(&self) -> NavResult<()> {
        let result = self.main_menu().await;
        self.preload.cancel().await;
        match &result {
            Ok(()) => info!("session ended"),
            Err(e) => error!(error = %e, "session aborted"),
        }
        result
    }

    async fn main_menu(&self) -> NavResult<()> {
        loop {
            self.prompter().heading("Main Menu");
            for line in menu::render(Section::ALL.iter().map(|s| s.label()), "To Exit") {
                self.prompter().say(&line);
            }
            let selection = choose(
                self.prompter(),
                "Select an option",
                0,
                Section::ALL.len(),
                Controls::NONE,
            )
            .await?;
            match selection {
                Selection::Item(0) => return Ok(()),
                Selection::Item(n) => self.run_section(Section::ALL[n - 1]).await?,
                _ => {}
            }
        }
    }

    /// Run one sub-menu until the operator returns.
    ///
    /// Workflow failures are reported and the sub-menu is shown again; only
    /// a broken terminal ends the session.
    pub async fn run_section(&self, section: Section) -> NavResult<()> {
        let actions = section.actions();
        loop {
            self.prompter().heading(section.label());
            for line in menu::render(actions.iter().map(|a| a.label), "To Return") {
                self.prompter().say(&line);
            }
            let selection = choose(
                self.prompter(),
                "Select an option",
                0,
                actions.len(),
                Controls::NAVIGATION,
            )
            .await?;
            let action = match selection {
                Selection::Item(n) if n > 0 => actions[n - 1],
                _ => return Ok(()),
            };

            info!(operation = ?action.operation, suspending = action.suspending, "start workflow");
            match self.execute(action.operation).await {
                Ok(Outcome::MainMenu) => return Ok(()),
                Ok(Outcome::Finished) => {}
                Err(e) if e.is_recoverable() => {
                    error!(operation = ?action.operation, error = %e, "workflow failed");
                    self.prompter().warn(&format!("{} failed: {e}", action.label));
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Run `operation` to completion.
    pub async fn execute(&self, operation: Operation) -> NavResult<Outcome> {
        let first = match operation {
            Operation::AddDestination => Step::AddDestination,
            Operation::AddPlace => Step::AddPlace { destination: None },
            Operation::AddAlbum => Step::AddAlbum {
                destination: None,
                place: None,
            },
            Operation::AddPhotos => Step::AddPhotos { destination: None },
            Operation::SetAlbumCover => Step::SetAlbumCover { destination: None },
            Operation::EditDestination => Step::EditDestination,
            Operation::EditPlace => Step::EditPlace { destination: None },
            Operation::DeleteDestination => Step::DeleteDestination,
            Operation::DeletePlace => Step::DeletePlace { destination: None },
            Operation::AddResumeEntry(kind) => Step::AddResumeEntry(kind),
            Operation::UpdateHomePhotos => Step::UpdateHomePhotos,
        };
        self.run_workflow(first).await
    }

    async fn run_workflow(&self, first: Step) -> NavResult<Outcome> {
        let mut pending = vec![first];
        while let Some(step) = pending.pop() {
            let name = step.name();
            debug!(step = name, pending = pending.len(), "run step");
            match self.run_step(step).await? {
                StepOutcome::Done => {}
                StepOutcome::Back => debug!(step = name, "backed out"),
                StepOutcome::Then(next) => pending.extend(next.into_iter().rev()),
                StepOutcome::MainMenu => {
                    debug!(step = name, discarded = pending.len(), "abandon workflow");
                    return Ok(Outcome::MainMenu);
                }
            }
        }
        Ok(Outcome::Finished)
    }

    async fn run_step(&self, step: Step) -> NavResult<StepOutcome> {
        match step {
            Step::AddDestination => self.add_destination().await,
            Step::AddPlace { destination } => self.add_place(destination).await,
            Step::OfferAlbum { destination, place } => {
                let question = format!("Add an album to {}?", place.name);
                Ok(if self.prompter().confirm(&question).await? {
                    StepOutcome::retry(Step::AddAlbum {
                        destination: Some(destination),
                        place: Some(place),
                    })
                } else {
                    StepOutcome::Done
                })
            }
            Step::OfferAnotherPlace { destination } => {
                let question = format!("Add another place to {}?", destination.name);
                Ok(if self.prompter().confirm(&question).await? {
                    StepOutcome::retry(Step::AddPlace {
                        destination: Some(destination),
                    })
                } else {
                    StepOutcome::Done
                })
            }
            Step::AddAlbum { destination, place } => self.add_album(destination, place).await,
            Step::OfferPhotos { album } => {
                let question = format!("Import photos from {} now?", album.title);
                if self.prompter().confirm(&question).await? {
                    self.importer.import_album(self.prompter(), &album).await?;
                }
                Ok(StepOutcome::Done)
            }
            Step::AddPhotos { destination } => self.add_photos(destination).await,
            Step::SetAlbumCover { destination } => self.set_album_cover(destination).await,
            Step::EditDestination => self.edit_destination().await,
            Step::EditPlace { destination } => self.edit_place(destination).await,
            Step::DeleteDestination => self.delete_destination().await,
            Step::DeletePlace { destination } => self.delete_place(destination).await,
            Step::AddResumeEntry(kind) => self.add_resume_entry(kind).await,
            Step::UpdateHomePhotos => self.update_home_photos().await,
        }
    }

    // ---------------------------------------------------------------
    // Selection helpers
    // ---------------------------------------------------------------

    async fn pick(&self, prompt: &str, labels: &[String], controls: Controls) -> NavResult<Selection> {
        for (i, label) in labels.iter().enumerate() {
            self.prompter().say(&format!("{}. {}", i + 1, label));
        }
        choose(self.prompter(), prompt, 1, labels.len(), controls).await
    }

    async fn select_destination(&self) -> NavResult<Flow<Destination>> {
        let mut destinations: Vec<Destination> = self.repo.all()?;
        if destinations.is_empty() {
            self.prompter().warn("No destinations yet. Add a destination first.");
            return Ok(Flow::Back);
        }
        sort_destinations(&mut destinations);
        let labels: Vec<String> = destinations.iter().map(|d| d.label()).collect();
        Ok(
            match self.pick("Select a destination", &labels, Controls::NAVIGATION).await? {
                Selection::Item(n) => Flow::Proceed(destinations.swap_remove(n - 1)),
                Selection::MainMenu => Flow::MainMenu,
                _ => Flow::Back,
            },
        )
    }

    /// Places of `destination` in display order.
    fn places_of(&self, destination: &Destination) -> NavResult<Vec<Place>> {
        let mut places: Vec<Place> = self.repo.children(&destination.place_id)?;
        sort_places(&mut places);
        Ok(places)
    }

    async fn select_place(&self, destination: &Destination) -> NavResult<Flow<Place>> {
        let mut places = self.places_of(destination)?;
        if places.is_empty() {
            self.prompter()
                .warn(&format!("No places in {} yet.", destination.name));
            return Ok(Flow::Back);
        }
        let labels: Vec<String> = places.iter().map(|p| p.label()).collect();
        Ok(
            match self.pick("Select a place", &labels, Controls::NAVIGATION).await? {
                Selection::Item(n) => Flow::Proceed(places.swap_remove(n - 1)),
                Selection::MainMenu => Flow::MainMenu,
                _ => Flow::Back,
            },
        )
    }

    /// The given destination, or one picked now. The flag tells whether it
    /// was picked here.
    async fn resolve_destination(
        &self,
        given: Option<Destination>,
    ) -> NavResult<Flow<(Destination, bool)>> {
        Ok(match given {
            Some(destination) => Flow::Proceed((destination, false)),
            None => match self.select_destination().await? {
                Flow::Proceed(destination) => Flow::Proceed((destination, true)),
                Flow::Back => Flow::Back,
                Flow::MainMenu => Flow::MainMenu,
            },
        })
    }

    /// The one album linked to `place`. Zero or several is an invalid state.
    fn single_album(&self, place: &Place) -> NavResult<Album> {
        let mut albums: Vec<Album> = self.repo.children(&place.place_id)?;
        match albums.len() {
            1 => Ok(albums.remove(0)),
            0 => Err(NavError::invalid_state(
                format!("place {} has no album", place.name),
                &place.destination_id,
                &place.place_id,
            )),
            n => Err(NavError::invalid_state(
                format!("place {} has {n} albums, expected one", place.name),
                &place.destination_id,
                &place.place_id,
            )),
        }
    }

    /// Ask before overwriting an existing record. Declining leaves storage
    /// untouched.
    async fn confirm_overwrite(&self, what: &str) -> NavResult<bool> {
        let overwrite = self
            .prompter()
            .confirm(&format!("{what} already exists. Overwrite?"))
            .await?;
        if !overwrite {
            info!(record = %what, "overwrite declined");
            self.prompter().say("Kept the existing record.");
        }
        Ok(overwrite)
    }

    /// Offer `suggestions` plus a manual entry option. `Proceed(None)` means
    /// the operator chose to type a place id.
    async fn choose_suggestion(&self, suggestions: &[Suggestion]) -> NavResult<Flow<Option<String>>> {
        if suggestions.is_empty() {
            self.prompter().say("No suggestions found.");
            return Ok(Flow::Proceed(None));
        }
        let mut labels: Vec<String> = suggestions.iter().map(|s| s.label()).collect();
        labels.push("Enter place id manually".to_string());
        Ok(
            match self.pick("Select a suggestion", &labels, Controls::NAVIGATION).await? {
                Selection::Item(n) if n <= suggestions.len() => {
                    Flow::Proceed(Some(suggestions[n - 1].place_id.clone()))
                }
                Selection::Item(_) => Flow::Proceed(None),
                Selection::MainMenu => Flow::MainMenu,
                _ => Flow::Back,
            },
        )
    }

    /// Ask for a typed place id until it is usable as a key segment.
    async fn ask_place_id(&self) -> NavResult<TextInput> {
        loop {
            let answer = ask_text(self.prompter(), "Enter place id").await?;
            if let TextInput::Text(id) = &answer {
                if let Err(e) = SortKey::validate_segment(id) {
                    debug!(place_id = %id, "rejected place id");
                    self.prompter().warn(&format!("Invalid place id: {e}"));
                    continue;
                }
            }
            return Ok(answer);
        }
    }

    // ---------------------------------------------------------------
    // Travel workflows
    // ---------------------------------------------------------------

    #[instrument(skip(self))]
    async fn add_destination(&self) -> NavResult<StepOutcome> {
        self.prompter().heading("Add Destination");
        let query = match ask_text(
            self.prompter(),
            "Enter destination name to use the autocomplete functionality",
        )
        .await?
        {
            TextInput::Text(text) => text,
            TextInput::Back => return Ok(StepOutcome::Back),
            TextInput::MainMenu => return Ok(StepOutcome::MainMenu),
        };

        let suggestions = self.places.suggest_destinations(&query).await?;
        let place_id = match self.choose_suggestion(&suggestions).await? {
            Flow::Proceed(Some(id)) => id,
            Flow::Proceed(None) => match self.ask_place_id().await? {
                TextInput::Text(id) => id,
                TextInput::Back => return Ok(StepOutcome::retry(Step::AddDestination)),
                TextInput::MainMenu => return Ok(StepOutcome::MainMenu),
            },
            Flow::Back => return Ok(StepOutcome::retry(Step::AddDestination)),
            Flow::MainMenu => return Ok(StepOutcome::MainMenu),
        };

        let destination = self
            .places
            .geocode_destination(&place_id)
            .await?
            .into_destination();
        if self.repo.exists::<Destination>(&destination.sort_key())?
            && !self
                .confirm_overwrite(&format!("Destination {}", destination.label()))
                .await?
        {
            return Ok(StepOutcome::Done);
        }

        let destination = match edit_entity(self.prompter(), &destination).await? {
            Flow::Proceed(edited) => edited,
            Flow::Back => return Ok(StepOutcome::retry(Step::AddDestination)),
            Flow::MainMenu => return Ok(StepOutcome::MainMenu),
        };
        self.repo.save(&destination)?;
        info!(place_id = %destination.place_id, name = %destination.name, "destination saved");
        self.prompter()
            .say(&format!("Saved destination {}", destination.label()));
        Ok(StepOutcome::Done)
    }

    #[instrument(skip_all)]
    async fn add_place(&self, given: Option<Destination>) -> NavResult<StepOutcome> {
        let (destination, picked) = match self.resolve_destination(given.clone()).await? {
            Flow::Proceed(resolved) => resolved,
            Flow::Back => return Ok(StepOutcome::Back),
            Flow::MainMenu => return Ok(StepOutcome::MainMenu),
        };
        let retry_same = Step::AddPlace {
            destination: Some(destination.clone()),
        };

        self.prompter()
            .heading(&format!("Add Place to {}", destination.name));
        let query = match ask_text(
            self.prompter(),
            "Enter place name to use the autocomplete functionality",
        )
        .await?
        {
            TextInput::Text(text) => text,
            TextInput::Back => {
                return Ok(back_out(picked, Step::AddPlace { destination: given }))
            }
            TextInput::MainMenu => return Ok(StepOutcome::MainMenu),
        };

        let near = Coordinates::of_destination(&destination);
        let suggestions = self.places.suggest_places(&query, Some(near)).await?;
        if suggestions.is_empty() {
            self.prompter().say("No suggestions found.");
            return Ok(StepOutcome::retry(retry_same));
        }
        let labels: Vec<String> = suggestions.iter().map(|s| s.label()).collect();
        let suggestion = match self
            .pick("Select a suggestion", &labels, Controls::NAVIGATION)
            .await?
        {
            Selection::Item(n) => &suggestions[n - 1],
            Selection::MainMenu => return Ok(StepOutcome::MainMenu),
            _ => return Ok(StepOutcome::retry(retry_same)),
        };

        let place = self
            .places
            .geocode_place(&suggestion.place_id)
            .await?
            .into_place(&suggestion.main_text, &destination);
        if self.repo.exists::<Place>(&place.sort_key())?
            && !self
                .confirm_overwrite(&format!("Place {} in {}", place.name, destination.name))
                .await?
        {
            return Ok(StepOutcome::Done);
        }

        let place = match edit_entity(self.prompter(), &place).await? {
            Flow::Proceed(edited) => edited,
            Flow::Back => return Ok(StepOutcome::retry(retry_same)),
            Flow::MainMenu => return Ok(StepOutcome::MainMenu),
        };
        self.repo.save(&place)?;
        info!(
            destination_id = %destination.place_id,
            place_id = %place.place_id,
            "place saved"
        );
        self.prompter().say(&format!("Saved place {}", place.name));
        Ok(StepOutcome::Then(vec![
            Step::OfferAlbum {
                destination: destination.clone(),
                place,
            },
            Step::OfferAnotherPlace { destination },
        ]))
    }

    #[instrument(skip_all)]
    async fn add_album(
        &self,
        given_destination: Option<Destination>,
        given_place: Option<Place>,
    ) -> NavResult<StepOutcome> {
        let (destination, picked_destination) =
            match self.resolve_destination(given_destination.clone()).await? {
                Flow::Proceed(resolved) => resolved,
                Flow::Back => return Ok(StepOutcome::Back),
                Flow::MainMenu => return Ok(StepOutcome::MainMenu),
            };
        let (place, picked_place) = match given_place.clone() {
            Some(place) => (place, false),
            None => match self.select_place(&destination).await? {
                Flow::Proceed(place) => (place, true),
                Flow::Back => {
                    return Ok(back_out(
                        picked_destination,
                        Step::AddAlbum {
                            destination: given_destination,
                            place: None,
                        },
                    ))
                }
                Flow::MainMenu => return Ok(StepOutcome::MainMenu),
            },
        };
        let retry_same = Step::AddAlbum {
            destination: Some(destination.clone()),
            place: Some(place.clone()),
        };

        self.prompter()
            .heading(&format!("Add Album to {}", place.name));
        let existing: Vec<Album> = self.repo.children(&place.place_id)?;
        if !existing.is_empty() {
            self.prompter().say("Existing album(s) for this place:");
            for album in &existing {
                self.prompter()
                    .say(&format!("  {} ({})", album.title, album.album_id));
            }
        }

        let albums = self.preload.albums().await?;
        let default_query = format!("{} -- {}", destination.name, place.name);
        let answer = self
            .prompter()
            .ask("Search albums", Some(&default_query))
            .await?;
        let query = match parse_text(&answer) {
            TextInput::Text(text) if text.is_empty() => default_query,
            TextInput::Text(text) => text,
            TextInput::Back => {
                return Ok(back_out(
                    picked_destination || picked_place,
                    Step::AddAlbum {
                        destination: given_destination,
                        place: given_place,
                    },
                ))
            }
            TextInput::MainMenu => return Ok(StepOutcome::MainMenu),
        };

        let ranked = rank_albums(&albums, &query, SUGGESTION_LIMIT);
        if ranked.is_empty() {
            self.prompter().warn("The photo library has no albums.");
            return Ok(StepOutcome::Done);
        }
        let labels: Vec<String> = ranked
            .iter()
            .map(|a| match a.media_items_count {
                Some(count) => format!("{} ({count} photos)", a.title),
                None => a.title.clone(),
            })
            .collect();
        let chosen = match self
            .pick("Select an album", &labels, Controls::NAVIGATION)
            .await?
        {
            Selection::Item(n) => &ranked[n - 1],
            Selection::MainMenu => return Ok(StepOutcome::MainMenu),
            _ => return Ok(StepOutcome::retry(retry_same)),
        };

        let previous = existing.iter().find(|a| a.album_id == chosen.id);
        if previous.is_some()
            && !self
                .confirm_overwrite(&format!("Album {} for {}", chosen.title, place.name))
                .await?
        {
            return Ok(StepOutcome::Done);
        }
        let mut album = Album::new(&chosen.id, &chosen.title, &destination.place_id, &place.place_id);
        if let Some(previous) = previous {
            album.cover_photo_id = previous.cover_photo_id.clone();
            album.cover_photo_url = previous.cover_photo_url.clone();
        }

        let stale: Vec<_> = existing.iter().map(|a| a.sort_key()).collect();
        self.repo.replace(&album, &stale)?;
        let replaced = existing.iter().filter(|a| a.album_id != album.album_id).count();
        info!(
            place_id = %place.place_id,
            album_id = %album.album_id,
            replaced,
            "album saved"
        );
        self.prompter()
            .say(&format!("Saved album {} for {}", album.title, place.name));
        if replaced > 0 {
            self.prompter()
                .say(&format!("Replaced {replaced} previous album(s)."));
        }
        Ok(StepOutcome::retry(Step::OfferPhotos { album }))
    }

    #[instrument(skip_all)]
    async fn add_photos(&self, given: Option<Destination>) -> NavResult<StepOutcome> {
        let (destination, picked) = match self.resolve_destination(given.clone()).await? {
            Flow::Proceed(resolved) => resolved,
            Flow::Back => return Ok(StepOutcome::Back),
            Flow::MainMenu => return Ok(StepOutcome::MainMenu),
        };
        let places = self.places_of(&destination)?;
        if places.is_empty() {
            self.prompter()
                .warn(&format!("No places in {} yet.", destination.name));
            return Ok(back_out(picked, Step::AddPhotos { destination: given }));
        }

        self.prompter()
            .heading(&format!("Add Photos to {}", destination.name));
        let labels: Vec<String> = places.iter().map(|p| p.label()).collect();
        let targets: Vec<&Place> = match self
            .pick("Select a place", &labels, Controls::WITH_ALL)
            .await?
        {
            Selection::Item(n) => vec![&places[n - 1]],
            Selection::All => places.iter().collect(),
            Selection::MainMenu => return Ok(StepOutcome::MainMenu),
            _ => return Ok(back_out(picked, Step::AddPhotos { destination: given })),
        };

        for place in targets {
            let album = self.single_album(place)?;
            self.prompter()
                .say(&format!("Importing {} into {}", album.title, place.name));
            self.importer.import_album(self.prompter(), &album).await?;
        }
        Ok(StepOutcome::Done)
    }

    #[instrument(skip_all)]
    async fn set_album_cover(&self, given: Option<Destination>) -> NavResult<StepOutcome> {
        let (destination, picked) = match self.resolve_destination(given.clone()).await? {
            Flow::Proceed(resolved) => resolved,
            Flow::Back => return Ok(StepOutcome::Back),
            Flow::MainMenu => return Ok(StepOutcome::MainMenu),
        };
        let place = match self.select_place(&destination).await? {
            Flow::Proceed(place) => place,
            Flow::Back => return Ok(back_out(picked, Step::SetAlbumCover { destination: given })),
            Flow::MainMenu => return Ok(StepOutcome::MainMenu),
        };
        let album = self.single_album(&place)?;
        let mut photos: Vec<Photo> = self.repo.children(&place.place_id)?;
        if photos.is_empty() {
            self.prompter()
                .warn(&format!("No photos imported for {} yet.", place.name));
            return Ok(StepOutcome::Done);
        }
        photos.sort_by_key(|p| p.creation_timestamp);

        self.prompter()
            .heading(&format!("Cover for {}", album.title));
        let labels: Vec<String> = photos.iter().map(|p| p.label()).collect();
        let photo = match self.pick("Select a photo", &labels, Controls::NAVIGATION).await? {
            Selection::Item(n) => &photos[n - 1],
            Selection::MainMenu => return Ok(StepOutcome::MainMenu),
            _ => {
                return Ok(StepOutcome::retry(Step::SetAlbumCover {
                    destination: Some(destination),
                }))
            }
        };
        self.repo.save(&album.with_cover(photo))?;
        info!(album_id = %album.album_id, photo_id = %photo.photo_id, "album cover set");
        self.prompter()
            .say(&format!("Cover of {} set to {}", album.title, photo.photo_id));
        Ok(StepOutcome::Done)
    }

    #[instrument(skip_all)]
    async fn edit_destination(&self) -> NavResult<StepOutcome> {
        let destination = match self.select_destination().await? {
            Flow::Proceed(destination) => destination,
            Flow::Back => return Ok(StepOutcome::Back),
            Flow::MainMenu => return Ok(StepOutcome::MainMenu),
        };
        self.prompter()
            .heading(&format!("Edit {}", destination.label()));
        let edited = match edit_entity(self.prompter(), &destination).await? {
            Flow::Proceed(edited) => edited,
            Flow::Back => return Ok(StepOutcome::retry(Step::EditDestination)),
            Flow::MainMenu => return Ok(StepOutcome::MainMenu),
        };
        if edited == destination {
            self.prompter().say("No changes.");
            return Ok(StepOutcome::Done);
        }
        self.repo.save(&edited)?;
        info!(place_id = %edited.place_id, "destination updated");
        self.prompter()
            .say(&format!("Saved destination {}", edited.label()));
        Ok(StepOutcome::Done)
    }

    #[instrument(skip_all)]
    async fn edit_place(&self, given: Option<Destination>) -> NavResult<StepOutcome> {
        let (destination, picked) = match self.resolve_destination(given.clone()).await? {
            Flow::Proceed(resolved) => resolved,
            Flow::Back => return Ok(StepOutcome::Back),
            Flow::MainMenu => return Ok(StepOutcome::MainMenu),
        };
        let place = match self.select_place(&destination).await? {
            Flow::Proceed(place) => place,
            Flow::Back => return Ok(back_out(picked, Step::EditPlace { destination: given })),
            Flow::MainMenu => return Ok(StepOutcome::MainMenu),
        };
        self.prompter().heading(&format!("Edit {}", place.name));
        let edited = match edit_entity(self.prompter(), &place).await? {
            Flow::Proceed(edited) => edited,
            Flow::Back => {
                return Ok(StepOutcome::retry(Step::EditPlace {
                    destination: Some(destination),
                }))
            }
            Flow::MainMenu => return Ok(StepOutcome::MainMenu),
        };
        if edited == place {
            self.prompter().say("No changes.");
            return Ok(StepOutcome::Done);
        }
        self.repo.save(&edited)?;
        info!(place_id = %edited.place_id, "place updated");
        self.prompter().say(&format!("Saved place {}", edited.name));
        Ok(StepOutcome::Done)
    }

    /// Queue deletes for `place` and every album and photo under it.
    /// Returns the album and photo counts.
    fn cascade_place(&self, place: &Place, batch: WriteBatch) -> NavResult<(WriteBatch, usize, usize)> {
        let albums: Vec<Album> = self.repo.children(&place.place_id)?;
        let photos: Vec<Photo> = self.repo.children(&place.place_id)?;
        let mut batch = batch;
        for photo in &photos {
            batch = batch.delete(Photo::PARTITION.key(), photo.sort_key().as_str());
        }
        for album in &albums {
            batch = batch.delete(Album::PARTITION.key(), album.sort_key().as_str());
        }
        batch = batch.delete(Place::PARTITION.key(), place.sort_key().as_str());
        Ok((batch, albums.len(), photos.len()))
    }

    #[instrument(skip_all)]
    async fn delete_destination(&self) -> NavResult<StepOutcome> {
        let destination = match self.select_destination().await? {
            Flow::Proceed(destination) => destination,
            Flow::Back => return Ok(StepOutcome::Back),
            Flow::MainMenu => return Ok(StepOutcome::MainMenu),
        };
        let places = self.places_of(&destination)?;
        let mut batch = WriteBatch::new();
        let (mut albums, mut photos) = (0, 0);
        for place in &places {
            let (next, a, p) = self.cascade_place(place, batch)?;
            batch = next;
            albums += a;
            photos += p;
        }
        batch = batch.delete(Destination::PARTITION.key(), destination.sort_key().as_str());

        let question = format!(
            "Delete {} with {} place(s), {albums} album(s) and {photos} photo record(s)?",
            destination.label(),
            places.len()
        );
        if !self.prompter().confirm(&question).await? {
            self.prompter().say("Nothing was deleted.");
            return Ok(StepOutcome::Done);
        }
        self.repo.apply(&batch)?;
        warn!(
            place_id = %destination.place_id,
            places = places.len(),
            albums,
            photos,
            "destination deleted"
        );
        self.prompter()
            .say(&format!("Deleted destination {}", destination.label()));
        Ok(StepOutcome::Done)
    }

    #[instrument(skip_all)]
    async fn delete_place(&self, given: Option<Destination>) -> NavResult<StepOutcome> {
        let (destination, picked) = match self.resolve_destination(given.clone()).await? {
            Flow::Proceed(resolved) => resolved,
            Flow::Back => return Ok(StepOutcome::Back),
            Flow::MainMenu => return Ok(StepOutcome::MainMenu),
        };
        let place = match self.select_place(&destination).await? {
            Flow::Proceed(place) => place,
            Flow::Back => return Ok(back_out(picked, Step::DeletePlace { destination: given })),
            Flow::MainMenu => return Ok(StepOutcome::MainMenu),
        };
        let (batch, albums, photos) = self.cascade_place(&place, WriteBatch::new())?;
        let question = format!(
            "Delete {} with {albums} album(s) and {photos} photo record(s)?",
            place.name
        );
        if !self.prompter().confirm(&question).await? {
            self.prompter().say("Nothing was deleted.");
            return Ok(StepOutcome::Done);
        }
        self.repo.apply(&batch)?;
        warn!(place_id = %place.place_id, albums, photos, "place deleted");
        self.prompter().say(&format!("Deleted place {}", place.name));
        Ok(StepOutcome::Done)
    }

    // ---------------------------------------------------------------
    // Resume and home workflows
    // ---------------------------------------------------------------

    #[instrument(skip(self))]
    async fn add_resume_entry(&self, kind: ResumeKind) -> NavResult<StepOutcome> {
        self.prompter().heading(&format!("Add {}", kind.name()));
        let id = uuid::Uuid::new_v4().to_string();
        let fields: Vec<&str> = kind
            .fields()
            .iter()
            .copied()
            .filter(|f| *f != ResumeKind::ID_FIELD)
            .collect();
        match kind {
            ResumeKind::Job => {
                let template = Job {
                    id,
                    company: String::new(),
                    role: String::new(),
                    started: String::new(),
                    ended: String::new(),
                    logo_url: String::new(),
                };
                self.save_resume_entry(&template, &fields).await
            }
            ResumeKind::Education => {
                let template = Education {
                    id,
                    school: String::new(),
                    level: String::new(),
                    year: String::new(),
                    major: String::new(),
                    gpa: Decimal::ZERO,
                    logo_url: String::new(),
                };
                self.save_resume_entry(&template, &fields).await
            }
            ResumeKind::Skill => {
                let template = Skill {
                    id,
                    name: String::new(),
                    logo_url: String::new(),
                };
                self.save_resume_entry(&template, &fields).await
            }
        }
    }

    async fn save_resume_entry<E: Entity>(
        &self,
        template: &E,
        fields: &[&str],
    ) -> NavResult<StepOutcome> {
        let entry = match fill_entity(self.prompter(), template, fields).await? {
            Flow::Proceed(entry) => entry,
            Flow::Back => return Ok(StepOutcome::Back),
            Flow::MainMenu => return Ok(StepOutcome::MainMenu),
        };

        let mut record = Record::from_entity(&entry)?;
        let source_url = record
            .field_str(ResumeKind::LOGO_FIELD)
            .unwrap_or_default()
            .to_string();
        if !source_url.is_empty() {
            let bytes = self.fetcher.fetch(&source_url).await?;
            let url = self.importer.upload_logo(&bytes).await?;
            record.entity[ResumeKind::LOGO_FIELD] = Value::String(url);
        }
        let entry: E = record.decode()?;
        self.repo.save(&entry)?;
        info!(kind = E::NAME, sort = %entry.sort_key(), "resume entry saved");
        self.prompter()
            .say(&format!("Saved {} {}", E::NAME, entry.label()));
        Ok(StepOutcome::Done)
    }

    #[instrument(skip(self))]
    async fn update_home_photos(&self) -> NavResult<StepOutcome> {
        self.prompter().heading("Update Home Photos");
        let albums = self.preload.albums().await?;
        let query = match ask_text(self.prompter(), "Search albums").await? {
            TextInput::Text(text) => text,
            TextInput::Back => return Ok(StepOutcome::Back),
            TextInput::MainMenu => return Ok(StepOutcome::MainMenu),
        };
        let ranked = rank_albums(&albums, &query, SUGGESTION_LIMIT);
        if ranked.is_empty() {
            self.prompter().warn("The photo library has no albums.");
            return Ok(StepOutcome::Done);
        }
        let labels: Vec<String> = ranked.iter().map(|a| a.title.clone()).collect();
        let chosen = match self
            .pick("Select an album", &labels, Controls::NAVIGATION)
            .await?
        {
            Selection::Item(n) => &ranked[n - 1],
            Selection::MainMenu => return Ok(StepOutcome::MainMenu),
            _ => return Ok(StepOutcome::retry(Step::UpdateHomePhotos)),
        };
        self.importer.import_home(self.prompter(), &chosen.id).await?;
        Ok(StepOutcome::Done)
    }
}

impl std::fmt::Debug for Navigator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Navigator")
            .field("repo", &self.repo)
            .field("importer", &self.importer)
            .finish_non_exhaustive()
    }
}

pub mod body;
pub mod camera;
pub mod character;
pub mod config;
pub mod constants;
pub mod enemy;
pub mod error;
pub mod health;
pub mod input;
pub mod jump;
pub mod layers;
pub mod math;
pub mod motor;
pub mod movement;
pub mod observer;
pub mod physics;
pub mod surface;
pub mod timer;

pub use body::{Body, ForceMode};
pub use camera::{CameraRig, CameraSettings, CameraTarget, OrbitState};
pub use character::{Character, CharacterBuilder, CharacterFrame, Enemy, Player};
pub use config::{InputConfig, KitConfig};
pub use enemy::{EnemyAi, EnemySettings, EnemyState, MeleeHit};
pub use error::{ConfigError, SetupError};
pub use health::{
    DamageResponse, DeathOutcome, Health, HealthEvent, HealthSettings, RemoveOnDeath,
    RespawnOnDeath,
};
pub use input::{
    AxisSource, ControlScheme, ControlType, InputAggregator, InputSettings, InputSnapshot,
    MobileInput,
};
pub use jump::{JumpKind, JumpSettings, JumpStrategy, JumpStyle, build_jump};
pub use layers::{FlagBitmask, Layer, LayerMask};
pub use math::{Pose, Quat, Vec3};
pub use motor::{CharacterMotor, MotionState, MotorSettings, VelocityImpulse, VelocityReset};
pub use movement::Locomotion;
pub use observer::{LogPresentation, Presentation};
pub use physics::{
    BodyMover, FreeMover, MoveOutcome, PhysicsQuery, RayHit,
    rapier_world::{CapsuleDef, ColliderShapeDef, RapierMover, RapierWorld, SurfaceDef},
};
pub use surface::{SurfaceId, SurfaceInfo, Tag, TagRegistry};
pub use timer::{FrameClock, Timers};

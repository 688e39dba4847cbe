use super::{Exercise, CATALOG_SIZE};

/// Fixed station catalog for the Zone A dumbbell circuit.
///
/// Each station pairs the main movement with an easier and a harder variant.
pub static EXERCISES: [Exercise; CATALOG_SIZE] = [
    Exercise::new(
        1,
        "DB Floor Press",
        "DB Flat Bench Press",
        "Single-Arm DB Bench Press",
    ),
    Exercise::new(
        2,
        "Chest-Supported DB Row",
        "1-Arm DB Bench Row",
        "Paused 1-Arm DB Row",
    ),
    Exercise::new(
        3,
        "Split Squat (Rear Foot Down)",
        "DB Bulgarian Split Squat",
        "Front-Rack DB Bulgarian Split Squat",
    ),
    Exercise::new(
        4,
        "DB Hip Hinge to Bench",
        "DB Romanian Deadlift",
        "Single-Leg DB RDL",
    ),
    Exercise::new(
        5,
        "Low Box Step-Up (BW)",
        "DB Step-Up",
        "Knee-Drive DB Step-Up",
    ),
    Exercise::new(
        6,
        "Neutral-Grip Seated DB Press",
        "DB Incline Bench Press",
        "Tempo Incline DB Press",
    ),
    Exercise::new(
        7,
        "Bent-Arm Rear Delt Fly",
        "Chest-Supported Rear Delt Fly",
        "Long-Lever Rear Delt Raise",
    ),
    Exercise::new(
        8,
        "Back-Supported DB Press",
        "DB Z-Press",
        "Single-Arm DB Z-Press",
    ),
    Exercise::new(
        9,
        "Incline Bench Renegade Row",
        "Bench-Supported Renegade Row",
        "Feet-Elevated Renegade Row + Push-Up",
    ),
    Exercise::new(
        10,
        "DB Glute Bridge",
        "DB Hip Thrust on Bench",
        "Single-Leg DB Hip Thrust",
    ),
];
